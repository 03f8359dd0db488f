//! Cachet Issuance
//!
//! The issuance orchestrator and the verification consensus engine: turns
//! credential drafts into committed multi-ledger results and recomputes
//! consensus verdicts from live ledger state.

pub mod consensus;
pub mod error;
pub mod orchestrator;

pub use consensus::ConsensusEngine;
pub use error::{IssuanceError, Stage};
pub use orchestrator::IssuanceOrchestrator;
