//! Integration test: revocation visibility and consensus downgrade.
//!
//! Revocations are append-only writes: the original record stays on the
//! ledger, its validity flips, and the consensus tier downgrades on the
//! next verification.

use std::sync::Arc;

use cachet_core::types::{
    ConsensusHint, ConsensusTier, CredentialDraft, IssuancePolicy, LedgerId, LedgerRecordRef,
    RecordPayload,
};
use cachet_issuance::{ConsensusEngine, IssuanceOrchestrator};
use cachet_ledger::adapters::MemoryLedger;
use cachet_ledger::{AdapterError, AdapterRegistry, ILedger, RetryPolicy};

fn draft() -> CredentialDraft {
    CredentialDraft::builder()
        .title("Certificate of Completion")
        .issuer("Acme University")
        .recipient("alice@wallet")
        .build()
        .expect("valid draft")
}

async fn commit(ledger: &MemoryLedger) -> LedgerRecordRef {
    ledger
        .submit(&RecordPayload::Credential(draft()))
        .await
        .expect("commit should succeed")
}

fn engine(adapters: Vec<Box<dyn ILedger>>) -> ConsensusEngine {
    let mut registry = AdapterRegistry::new();
    for adapter in adapters {
        registry.register_adapter(adapter);
    }
    ConsensusEngine::new(Arc::new(registry)).with_retry_policy(RetryPolicy::no_backoff(2))
}

// =========================================================================
// Revocation mechanics: append-only, never an edit
// =========================================================================

#[tokio::test]
async fn test_revocation_is_a_new_record() {
    let ledger = MemoryLedger::new(LedgerId::new("mainline"));
    let committed = commit(&ledger).await;
    assert_eq!(ledger.record_count(), 1);

    let revocation = ledger
        .revoke(&committed.record_id)
        .await
        .expect("revocation should commit");

    // Two records now: the original and its revocation tombstone
    assert_eq!(ledger.record_count(), 2);
    assert_ne!(revocation.record_id, committed.record_id);

    // The original is still fetchable, just no longer valid
    let original = ledger.fetch(&committed.record_id).await.unwrap();
    assert!(matches!(original.payload, RecordPayload::Credential(_)));
    assert!(!ledger.check_validity(&committed.record_id).await.unwrap());
}

#[tokio::test]
async fn test_revoking_unknown_record_is_rejected() {
    let ledger = MemoryLedger::new(LedgerId::new("mainline"));
    commit(&ledger).await;

    let result = ledger
        .revoke(&cachet_core::types::RecordId::new("no-such-record"))
        .await;
    assert!(matches!(result, Err(AdapterError::Rejected { .. })));
    assert_eq!(ledger.record_count(), 1);
}

// =========================================================================
// Consensus downgrade: multi-chain → single-chain → none
// =========================================================================

#[tokio::test]
async fn test_revocations_downgrade_consensus_stepwise() {
    let a = MemoryLedger::new(LedgerId::new("a"));
    let b = MemoryLedger::new(LedgerId::new("b"));
    let ref_a = commit(&a).await;
    let ref_b = commit(&b).await;
    let engine = engine(vec![Box::new(a.clone()), Box::new(b.clone())]);
    let refs = vec![ref_a.clone(), ref_b.clone()];

    let initial = engine.verify(&refs).await;
    assert_eq!(initial.tier, ConsensusTier::MultiChain);

    // First revocation: one chain still confirms
    b.revoke(&ref_b.record_id).await.unwrap();
    let degraded = engine.verify(&refs).await;
    assert!(degraded.is_valid);
    assert_eq!(degraded.tier, ConsensusTier::SingleChain);

    // A revoked record is a definitive no, not a failed check
    let revoked = &degraded.contributing[1];
    assert!(!revoked.is_valid);
    assert!(revoked.error.is_none());

    // Second revocation: nothing confirms any more
    a.revoke(&ref_a.record_id).await.unwrap();
    let gone = engine.verify(&refs).await;
    assert!(!gone.is_valid);
    assert_eq!(gone.tier, ConsensusTier::None);
    assert!(gone.contributing.iter().all(|o| o.error.is_none()));
}

#[tokio::test]
async fn test_revoked_primary_leaves_shadow_confirming() {
    let mainline = MemoryLedger::new(LedgerId::new("mainline"));
    let mirror = MemoryLedger::new(LedgerId::new("zk-mirror"));
    let mut registry = AdapterRegistry::new();
    registry.register_adapter(Box::new(mainline.clone()));
    registry.register_adapter(Box::new(mirror.clone()));
    let registry = Arc::new(registry);
    let orchestrator = IssuanceOrchestrator::new(Arc::clone(&registry))
        .with_retry_policy(RetryPolicy::no_backoff(2))
        .with_privacy_ledger(LedgerId::new("zk-mirror"));
    let engine = ConsensusEngine::new(Arc::clone(&registry))
        .with_retry_policy(RetryPolicy::no_backoff(2));

    let result = orchestrator
        .issue(
            draft(),
            IssuancePolicy::new(LedgerId::new("mainline")).with_privacy(),
        )
        .await
        .expect("issuance should succeed");
    assert_eq!(result.hint, ConsensusHint::MultiLedger);

    let refs = vec![result.primary.clone(), result.privacy.clone().unwrap()];
    assert_eq!(engine.verify(&refs).await.tier, ConsensusTier::MultiChain);

    // Revoking the primary leaves the shadow record as the only vote
    mainline.revoke(&result.primary.record_id).await.unwrap();
    let after = engine.verify(&refs).await;
    assert!(after.is_valid);
    assert_eq!(after.tier, ConsensusTier::SingleChain);
    assert!(after.contributing[1].is_valid);
}
