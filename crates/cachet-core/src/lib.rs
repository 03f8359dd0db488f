//! Cachet Core — Fundamental value types, configuration, and errors for the
//! Cachet multi-ledger credential orchestrator.

pub mod config;
pub mod error;
pub mod types;

pub use config::{CachetConfig, IssuanceConfig, LedgerConfig, RetrySettings, VerificationConfig};
pub use error::CoreError;
pub use types::{
    ConsensusHint, ConsensusTier, ConsensusVerdict, CredentialDraft, CredentialDraftBuilder,
    IssuancePolicy, IssuanceResult, LedgerId, LedgerRecordRef, LinkageHash, RecordId,
    RecordPayload, VerificationOutcome,
};
