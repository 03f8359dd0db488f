use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use cachet_core::types::{LedgerId, LedgerRecordRef, RecordId, RecordPayload};

use crate::error::AdapterError;

/// Connectivity report from one adapter.
///
/// Never an error: an unreachable ledger is data, not a failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connectivity {
    /// Whether the ledger can currently be reached.
    pub reachable: bool,
    /// Human-readable detail (endpoint, record count, failure cause).
    pub detail: String,
}

impl Connectivity {
    /// A reachable ledger with the given detail.
    pub fn reachable(detail: impl Into<String>) -> Self {
        Self {
            reachable: true,
            detail: detail.into(),
        }
    }

    /// An unreachable ledger with the given cause.
    pub fn unreachable(detail: impl Into<String>) -> Self {
        Self {
            reachable: false,
            detail: detail.into(),
        }
    }
}

/// A committed record as fetched back from a ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerRecord {
    /// Ledger-native record identifier.
    pub record_id: RecordId,
    /// The payload as committed.
    pub payload: RecordPayload,
    /// When the ledger committed the record.
    pub committed_at: DateTime<Utc>,
    /// Opaque proof evidence emitted at commit time.
    pub proof: Vec<u8>,
}

/// Ledger adapter interface.
///
/// Each implementation bridges the orchestrator to a concrete ledger
/// (blockchain, rollup gateway, in-memory test ledger). Adapters own their
/// connection and signing state; the orchestrator and consensus engine only
/// ever see this contract.
#[async_trait]
pub trait ILedger: Send + Sync {
    /// Write one record. Returns a ref that is never mutated afterwards;
    /// a correction is a new submit, not an edit.
    ///
    /// Fails with [`AdapterError::Unavailable`] (transient, retryable) or
    /// [`AdapterError::Rejected`] (terminal, surfaced immediately).
    async fn submit(&self, payload: &RecordPayload) -> Result<LedgerRecordRef, AdapterError>;

    /// Fetch a committed record. Fails with [`AdapterError::NotFound`] when
    /// the record does not exist, distinct from `Unavailable`.
    async fn fetch(&self, record_id: &RecordId) -> Result<LedgerRecord, AdapterError>;

    /// True iff the record exists and has not been superseded by a
    /// revocation record for the same record id.
    async fn check_validity(&self, record_id: &RecordId) -> Result<bool, AdapterError>;

    /// Report current connectivity.
    async fn connectivity(&self) -> Connectivity;

    /// The ledger this adapter writes to.
    fn ledger_id(&self) -> &LedgerId;
}
