//! In-memory append-only ledger.
//!
//! The reference adapter: a DashMap-backed record store with revocation
//! tombstones, bs58-encoded BLAKE3 record ids, and Ed25519 proofs over the
//! canonical record bytes. Fault-injection switches make it double as a
//! deterministic stand-in for an unreliable network ledger in tests.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use uuid::Uuid;

use cachet_core::types::{LedgerId, LedgerRecordRef, RecordId, RecordPayload};
use cachet_crypto::{sign, KeyPair, PublicKey};

use crate::error::AdapterError;
use crate::traits::{Connectivity, ILedger, LedgerRecord};

/// One committed entry. Entries are never mutated; a revocation is a new
/// entry plus a tombstone index pointing at its target.
#[derive(Debug, Clone)]
struct StoredRecord {
    record_id: RecordId,
    payload: RecordPayload,
    committed_at: DateTime<Utc>,
    proof: Vec<u8>,
}

struct MemoryState {
    /// All committed records, keyed by record id.
    records: DashMap<String, StoredRecord>,
    /// Revoked target record id -> revocation record id.
    revoked: DashMap<String, String>,
    /// Fault injection: every call reports the ledger unreachable.
    unreachable: AtomicBool,
    /// Fault injection: submits fail as transient unavailability.
    fail_submits: AtomicBool,
    /// Submit calls observed, including failed ones.
    submit_attempts: AtomicU64,
}

/// In-memory append-only ledger adapter.
///
/// Clones share the same underlying store, so a test can keep a handle for
/// fault switches and inspection while the registry owns the boxed adapter.
#[derive(Clone)]
pub struct MemoryLedger {
    id: LedgerId,
    state: Arc<MemoryState>,
    keypair: Arc<KeyPair>,
}

impl MemoryLedger {
    /// Create an empty ledger with a fresh signing key.
    pub fn new(id: LedgerId) -> Self {
        Self {
            id,
            state: Arc::new(MemoryState {
                records: DashMap::new(),
                revoked: DashMap::new(),
                unreachable: AtomicBool::new(false),
                fail_submits: AtomicBool::new(false),
                submit_attempts: AtomicU64::new(0),
            }),
            keypair: Arc::new(KeyPair::generate()),
        }
    }

    /// The key that signs this ledger's record proofs.
    pub fn public_key(&self) -> PublicKey {
        self.keypair.public_key()
    }

    /// Make every call fail as unreachable (or restore reachability).
    pub fn set_unreachable(&self, unreachable: bool) {
        self.state.unreachable.store(unreachable, Ordering::SeqCst);
    }

    /// Make submits fail with a transient `Unavailable` error.
    pub fn set_fail_submits(&self, fail: bool) {
        self.state.fail_submits.store(fail, Ordering::SeqCst);
    }

    /// Number of submit calls observed, including failed ones.
    pub fn submit_attempts(&self) -> u64 {
        self.state.submit_attempts.load(Ordering::SeqCst)
    }

    /// Number of committed records, revocation entries included.
    pub fn record_count(&self) -> usize {
        self.state.records.len()
    }

    /// Append a revocation record superseding `target`.
    ///
    /// A distinct write, never an edit: the target entry stays in the store
    /// and `check_validity(target)` turns false.
    pub async fn revoke(&self, target: &RecordId) -> Result<LedgerRecordRef, AdapterError> {
        if !self.state.records.contains_key(target.as_str()) {
            return Err(AdapterError::Rejected {
                ledger: self.id.clone(),
                reason: format!("revocation target not found: {}", target),
            });
        }
        self.submit(&RecordPayload::Revocation {
            target: target.clone(),
        })
        .await
    }

    /// Canonical bytes for one entry: a unique submission nonce followed by
    /// the JSON payload. The nonce keeps two identical payloads from
    /// colliding into one record id; the ledger is append-only.
    fn canonical_bytes(&self, nonce: &Uuid, payload: &RecordPayload) -> Result<Vec<u8>, AdapterError> {
        let encoded = serde_json::to_vec(payload).map_err(|e| AdapterError::Rejected {
            ledger: self.id.clone(),
            reason: format!("unencodable payload: {}", e),
        })?;
        let mut bytes = nonce.as_bytes().to_vec();
        bytes.extend_from_slice(&encoded);
        Ok(bytes)
    }

    fn check_reachable(&self) -> Result<(), AdapterError> {
        if self.state.unreachable.load(Ordering::SeqCst) {
            return Err(AdapterError::unavailable(&self.id, "ledger unreachable"));
        }
        Ok(())
    }

    fn validate_payload(&self, payload: &RecordPayload) -> Result<(), AdapterError> {
        match payload {
            RecordPayload::Credential(draft) => {
                draft.validate().map_err(|e| AdapterError::Rejected {
                    ledger: self.id.clone(),
                    reason: e.to_string(),
                })
            }
            RecordPayload::Shadow { recipient, .. } => {
                if recipient.trim().is_empty() {
                    return Err(AdapterError::Rejected {
                        ledger: self.id.clone(),
                        reason: "shadow record has empty recipient".into(),
                    });
                }
                Ok(())
            }
            RecordPayload::Revocation { target } => {
                if !self.state.records.contains_key(target.as_str()) {
                    return Err(AdapterError::Rejected {
                        ledger: self.id.clone(),
                        reason: format!("revocation target not found: {}", target),
                    });
                }
                Ok(())
            }
        }
    }
}

#[async_trait]
impl ILedger for MemoryLedger {
    async fn submit(&self, payload: &RecordPayload) -> Result<LedgerRecordRef, AdapterError> {
        self.state.submit_attempts.fetch_add(1, Ordering::SeqCst);
        self.check_reachable()?;
        if self.state.fail_submits.load(Ordering::SeqCst) {
            return Err(AdapterError::unavailable(&self.id, "injected submit failure"));
        }
        self.validate_payload(payload)?;

        let nonce = Uuid::now_v7();
        let bytes = self.canonical_bytes(&nonce, payload)?;
        let record_id = RecordId::new(bs58::encode(blake3::hash(&bytes).as_bytes()).into_string());
        // The proof signs the record id, so any holder of the ref and this
        // ledger's public key can check it without the submission nonce.
        let proof = sign(record_id.as_str().as_bytes(), &self.keypair)
            .to_bytes()
            .to_vec();

        let record = StoredRecord {
            record_id: record_id.clone(),
            payload: payload.clone(),
            committed_at: Utc::now(),
            proof: proof.clone(),
        };
        self.state
            .records
            .insert(record_id.as_str().to_string(), record);

        if let RecordPayload::Revocation { target } = payload {
            self.state
                .revoked
                .insert(target.as_str().to_string(), record_id.as_str().to_string());
        }

        tracing::info!(
            ledger = %self.id,
            record_id = %record_id,
            kind = payload.kind(),
            "record committed"
        );

        Ok(LedgerRecordRef {
            ledger: self.id.clone(),
            record_id,
            proof,
            explorer_url: None,
        })
    }

    async fn fetch(&self, record_id: &RecordId) -> Result<LedgerRecord, AdapterError> {
        self.check_reachable()?;
        let record = self
            .state
            .records
            .get(record_id.as_str())
            .ok_or_else(|| AdapterError::NotFound {
                ledger: self.id.clone(),
                record_id: record_id.clone(),
            })?;
        Ok(LedgerRecord {
            record_id: record.record_id.clone(),
            payload: record.payload.clone(),
            committed_at: record.committed_at,
            proof: record.proof.clone(),
        })
    }

    async fn check_validity(&self, record_id: &RecordId) -> Result<bool, AdapterError> {
        self.check_reachable()?;
        if !self.state.records.contains_key(record_id.as_str()) {
            return Err(AdapterError::NotFound {
                ledger: self.id.clone(),
                record_id: record_id.clone(),
            });
        }
        Ok(!self.state.revoked.contains_key(record_id.as_str()))
    }

    async fn connectivity(&self) -> Connectivity {
        if self.state.unreachable.load(Ordering::SeqCst) {
            Connectivity::unreachable("injected outage")
        } else {
            Connectivity::reachable(format!(
                "in-memory ledger, {} record(s)",
                self.state.records.len()
            ))
        }
    }

    fn ledger_id(&self) -> &LedgerId {
        &self.id
    }
}
