//! Integration test: multi-ledger issuance across crates.
//!
//! Drives the issuance orchestrator against in-memory ledgers and checks
//! the committed artifacts with cachet-crypto and the consensus engine.

use std::sync::Arc;

use cachet_core::config::CachetConfig;
use cachet_core::types::{
    ConsensusHint, ConsensusTier, CredentialDraft, IssuancePolicy, LedgerId, RecordPayload,
};
use cachet_crypto::{verify, Signature};
use cachet_issuance::{ConsensusEngine, IssuanceError, IssuanceOrchestrator, Stage};
use cachet_ledger::adapters::MemoryLedger;
use cachet_ledger::{registry_from_config, AdapterRegistry, ILedger, RetryPolicy};

/// Helper: a draft for "Alice" with no document hash.
fn draft() -> CredentialDraft {
    CredentialDraft::builder()
        .title("Certificate of Completion")
        .issuer("Acme University")
        .recipient("alice@wallet")
        .build()
        .expect("valid draft")
}

/// Helper: registry over the given adapters plus an orchestrator and a
/// consensus engine with fast retries, privacy routed to "zk-mirror".
fn stack(
    adapters: Vec<Box<dyn ILedger>>,
) -> (Arc<AdapterRegistry>, IssuanceOrchestrator, ConsensusEngine) {
    let mut registry = AdapterRegistry::new();
    for adapter in adapters {
        registry.register_adapter(adapter);
    }
    let registry = Arc::new(registry);
    let orchestrator = IssuanceOrchestrator::new(Arc::clone(&registry))
        .with_retry_policy(RetryPolicy::no_backoff(3))
        .with_privacy_ledger(LedgerId::new("zk-mirror"));
    let engine = ConsensusEngine::new(Arc::clone(&registry))
        .with_retry_policy(RetryPolicy::no_backoff(3));
    (registry, orchestrator, engine)
}

// =========================================================================
// Multi-ledger issuance: primary record + linked shadow record
// =========================================================================

#[tokio::test]
async fn test_multi_ledger_issuance_and_cross_check() {
    let mainline = MemoryLedger::new(LedgerId::new("mainline"));
    let mirror = MemoryLedger::new(LedgerId::new("zk-mirror"));
    let (_registry, orchestrator, engine) = stack(vec![
        Box::new(mainline.clone()),
        Box::new(mirror.clone()),
    ]);

    // Issue with the privacy layer requested
    let result = orchestrator
        .issue(
            draft(),
            IssuancePolicy::new(LedgerId::new("mainline")).with_privacy(),
        )
        .await
        .expect("issuance should succeed");

    assert_eq!(result.hint, ConsensusHint::MultiLedger);
    assert_eq!(result.primary.ledger, LedgerId::new("mainline"));
    let shadow_ref = result.privacy.as_ref().expect("shadow record committed");
    assert_eq!(shadow_ref.ledger, LedgerId::new("zk-mirror"));

    // The primary proof is an ed25519 signature over the record id,
    // checkable by any holder of the ref and the ledger's public key
    let signature = Signature::from_bytes(&result.primary.proof).expect("64-byte proof");
    verify(
        result.primary.record_id.as_str().as_bytes(),
        &signature,
        &mainline.public_key(),
    )
    .expect("proof should verify");

    // The shadow record binds back to the primary via the linkage hash
    let linkage = result.linkage.expect("linkage committed");
    let bound = engine
        .cross_check_linkage(shadow_ref, &linkage)
        .await
        .expect("shadow fetch should succeed");
    assert!(bound);
}

#[tokio::test]
async fn test_shadow_record_never_carries_content() {
    let mainline = MemoryLedger::new(LedgerId::new("mainline"));
    let mirror = MemoryLedger::new(LedgerId::new("zk-mirror"));
    let (_registry, orchestrator, _engine) = stack(vec![
        Box::new(mainline),
        Box::new(mirror.clone()),
    ]);

    let result = orchestrator
        .issue(
            draft(),
            IssuancePolicy::new(LedgerId::new("mainline")).with_privacy(),
        )
        .await
        .unwrap();

    let shadow_ref = result.privacy.expect("shadow record committed");
    let shadow = mirror.fetch(&shadow_ref.record_id).await.unwrap();
    assert!(matches!(shadow.payload, RecordPayload::Shadow { .. }));

    // Serialized shadow payload exposes the recipient and the commitment,
    // never the credential content
    let json = serde_json::to_string(&shadow.payload).unwrap();
    assert!(json.contains("alice@wallet"));
    assert!(!json.contains("Certificate of Completion"));
    assert!(!json.contains("Acme University"));
}

// =========================================================================
// Partial failure: privacy degrades, primary never does
// =========================================================================

#[tokio::test]
async fn test_privacy_outage_degrades_issuance() {
    let mainline = MemoryLedger::new(LedgerId::new("mainline"));
    let mirror = MemoryLedger::new(LedgerId::new("zk-mirror"));
    mirror.set_fail_submits(true);
    let (_registry, orchestrator, _engine) = stack(vec![
        Box::new(mainline.clone()),
        Box::new(mirror.clone()),
    ]);

    let result = orchestrator
        .issue(
            draft(),
            IssuancePolicy::new(LedgerId::new("mainline")).with_privacy(),
        )
        .await
        .expect("primary alone still succeeds");

    assert_eq!(result.hint, ConsensusHint::PrivacyDegraded);
    assert!(result.privacy.is_none());
    assert!(result.linkage.is_none());
    // Privacy was retried to exhaustion, primary committed exactly once
    assert_eq!(mirror.submit_attempts(), 3);
    assert_eq!(mainline.record_count(), 1);
}

#[tokio::test]
async fn test_primary_outage_attempts_no_privacy() {
    let mainline = MemoryLedger::new(LedgerId::new("mainline"));
    mainline.set_unreachable(true);
    let mirror = MemoryLedger::new(LedgerId::new("zk-mirror"));
    let (_registry, orchestrator, _engine) = stack(vec![
        Box::new(mainline.clone()),
        Box::new(mirror.clone()),
    ]);

    let err = orchestrator
        .issue(
            draft(),
            IssuancePolicy::new(LedgerId::new("mainline")).with_privacy(),
        )
        .await
        .expect_err("primary outage is fatal");

    match err {
        IssuanceError::Failed { stage, source } => {
            assert_eq!(stage, Stage::Primary);
            assert!(source.is_exhausted());
            assert_eq!(source.attempts(), 3);
        }
        other => panic!("expected primary failure, got {}", other),
    }
    // The shadow ledger was never touched
    assert_eq!(mirror.submit_attempts(), 0);
    assert_eq!(mirror.record_count(), 0);
}

// =========================================================================
// Configuration-driven wiring: TOML → registry → issue → verify
// =========================================================================

#[tokio::test]
async fn test_config_wired_end_to_end() {
    let toml_str = r#"
[issuance]
default_ledger = "mainline"
privacy_ledger = "zk-mirror"

[retry]
max_attempts = 2
backoff_base_ms = 1

[ledgers.mainline]
kind = "memory"

[ledgers.zk-mirror]
kind = "memory"
"#;
    let config: CachetConfig = toml::from_str(toml_str).expect("config parses");
    let registry = Arc::new(registry_from_config(&config).expect("registry builds"));
    let orchestrator = IssuanceOrchestrator::from_config(Arc::clone(&registry), &config);
    let engine = ConsensusEngine::from_config(Arc::clone(&registry), &config);

    let result = orchestrator
        .issue(draft(), IssuancePolicy::new(config.default_ledger()).with_privacy())
        .await
        .expect("issuance should succeed");
    assert_eq!(result.hint, ConsensusHint::MultiLedger);

    // Both committed records confirm: multi-chain consensus
    let refs = vec![result.primary.clone(), result.privacy.clone().unwrap()];
    let verdict = engine.verify(&refs).await;
    assert!(verdict.is_valid);
    assert_eq!(verdict.tier, ConsensusTier::MultiChain);
    assert_eq!(verdict.valid_count(), 2);
}
