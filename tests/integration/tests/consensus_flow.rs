//! Integration test: consensus verdicts over live ledger state.
//!
//! Commits records directly through the adapter contract, then exercises
//! the consensus engine's tiering, partial-outage handling, and recovery.

use std::sync::Arc;

use cachet_core::types::{
    ConsensusTier, CredentialDraft, LedgerId, LedgerRecordRef, RecordId, RecordPayload,
};
use cachet_issuance::ConsensusEngine;
use cachet_ledger::adapters::MemoryLedger;
use cachet_ledger::{AdapterRegistry, ILedger, RetryPolicy};

/// Helper: commit one credential record and return its ref.
async fn commit(ledger: &MemoryLedger) -> LedgerRecordRef {
    let draft = CredentialDraft::builder()
        .title("Certificate of Completion")
        .issuer("Acme University")
        .recipient("alice@wallet")
        .build()
        .expect("valid draft");
    ledger
        .submit(&RecordPayload::Credential(draft))
        .await
        .expect("commit should succeed")
}

/// Helper: consensus engine over the given adapters with fast retries.
fn engine(adapters: Vec<Box<dyn ILedger>>) -> ConsensusEngine {
    let mut registry = AdapterRegistry::new();
    for adapter in adapters {
        registry.register_adapter(adapter);
    }
    ConsensusEngine::new(Arc::new(registry)).with_retry_policy(RetryPolicy::no_backoff(2))
}

// =========================================================================
// Tiering: confirmations upgrade confidence, never flip validity
// =========================================================================

#[tokio::test]
async fn test_single_confirmation_is_single_chain() {
    let a = MemoryLedger::new(LedgerId::new("a"));
    let ref_a = commit(&a).await;
    let engine = engine(vec![Box::new(a)]);

    let verdict = engine.verify(&[ref_a]).await;

    assert!(verdict.is_valid);
    assert_eq!(verdict.tier, ConsensusTier::SingleChain);
    assert_eq!(verdict.valid_count(), 1);
}

#[tokio::test]
async fn test_second_confirmation_upgrades_to_multi_chain() {
    let a = MemoryLedger::new(LedgerId::new("a"));
    let b = MemoryLedger::new(LedgerId::new("b"));
    let ref_a = commit(&a).await;
    let ref_b = commit(&b).await;
    let engine = engine(vec![Box::new(a), Box::new(b)]);

    let one = engine.verify(&[ref_a.clone()]).await;
    let both = engine.verify(&[ref_a, ref_b]).await;

    // The extra confirmation upgrades the tier, not the boolean
    assert!(one.is_valid);
    assert!(both.is_valid);
    assert_eq!(one.tier, ConsensusTier::SingleChain);
    assert_eq!(both.tier, ConsensusTier::MultiChain);
}

// =========================================================================
// Partial and total outage
// =========================================================================

#[tokio::test]
async fn test_unreachable_ledger_downgrades_tier_not_validity() {
    let a = MemoryLedger::new(LedgerId::new("a"));
    let b = MemoryLedger::new(LedgerId::new("b"));
    let ref_a = commit(&a).await;
    let ref_b = commit(&b).await;
    b.set_unreachable(true);
    let engine = engine(vec![Box::new(a), Box::new(b)]);

    let verdict = engine.verify(&[ref_a, ref_b]).await;

    assert!(verdict.is_valid);
    assert_eq!(verdict.tier, ConsensusTier::SingleChain);

    // The outage is reported per ledger, never silently dropped
    assert_eq!(verdict.contributing.len(), 2);
    let outage = &verdict.contributing[1];
    assert!(!outage.is_valid);
    assert!(outage.error.as_deref().unwrap().contains("unavailable"));
}

#[tokio::test]
async fn test_total_outage_is_a_verdict_not_an_error() {
    let a = MemoryLedger::new(LedgerId::new("a"));
    let b = MemoryLedger::new(LedgerId::new("b"));
    let ref_a = commit(&a).await;
    let ref_b = commit(&b).await;
    a.set_unreachable(true);
    b.set_unreachable(true);
    let engine = engine(vec![Box::new(a), Box::new(b)]);

    let verdict = engine.verify(&[ref_a, ref_b]).await;

    assert!(!verdict.is_valid);
    assert_eq!(verdict.tier, ConsensusTier::None);
    assert!(verdict.contributing.iter().all(|o| o.error.is_some()));
}

#[tokio::test]
async fn test_recovery_restores_tier_on_next_verification() {
    let a = MemoryLedger::new(LedgerId::new("a"));
    let b = MemoryLedger::new(LedgerId::new("b"));
    let ref_a = commit(&a).await;
    let ref_b = commit(&b).await;
    let engine = engine(vec![Box::new(a), Box::new(b.clone())]);
    let refs = vec![ref_a, ref_b];

    b.set_unreachable(true);
    let degraded = engine.verify(&refs).await;
    assert_eq!(degraded.tier, ConsensusTier::SingleChain);

    // Verdicts are recomputed from live state: the tier comes back
    b.set_unreachable(false);
    let recovered = engine.verify(&refs).await;
    assert_eq!(recovered.tier, ConsensusTier::MultiChain);
}

// =========================================================================
// Verdict stability and ref hygiene
// =========================================================================

#[tokio::test]
async fn test_verify_is_idempotent_without_state_change() {
    let a = MemoryLedger::new(LedgerId::new("a"));
    let ref_a = commit(&a).await;
    let engine = engine(vec![Box::new(a)]);
    let refs = vec![ref_a];

    let first = engine.verify(&refs).await;
    let second = engine.verify(&refs).await;

    assert_eq!(first.is_valid, second.is_valid);
    assert_eq!(first.tier, second.tier);
    assert_eq!(first.valid_count(), second.valid_count());
}

#[tokio::test]
async fn test_ref_against_wrong_ledger_is_unconfirmed() {
    let a = MemoryLedger::new(LedgerId::new("a"));
    let b = MemoryLedger::new(LedgerId::new("b"));
    let ref_a = commit(&a).await;
    let engine = engine(vec![Box::new(a), Box::new(b)]);

    // Same record id, wrong ledger: "b" has never seen it
    let misdirected = LedgerRecordRef {
        ledger: LedgerId::new("b"),
        record_id: RecordId::new(ref_a.record_id.as_str()),
        proof: Vec::new(),
        explorer_url: None,
    };
    let verdict = engine.verify(&[misdirected]).await;

    assert!(!verdict.is_valid);
    let outcome = &verdict.contributing[0];
    assert!(!outcome.is_valid);
    assert!(outcome.error.as_deref().unwrap().contains("not found"));
}
