use std::fmt;

use cachet_core::error::CoreError;
use cachet_ledger::{AdapterError, RetryError};

/// The stage of an issuance that can fail the whole call.
///
/// Privacy failures degrade the result instead of failing it, so the
/// primary stage is the only one that ever appears in an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Writing the authoritative primary record.
    Primary,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primary => write!(f, "primary"),
        }
    }
}

/// Issuance orchestrator errors.
#[derive(Debug, thiserror::Error)]
pub enum IssuanceError {
    /// The draft failed validation before any ledger was touched.
    #[error("invalid credential draft: {0}")]
    InvalidDraft(#[from] CoreError),

    /// A ledger write failed terminally or exhausted its retry budget.
    #[error("issuance failed at {stage} stage: {source}")]
    Failed {
        stage: Stage,
        #[source]
        source: RetryError<AdapterError>,
    },

    /// The overall issuance deadline expired mid-stage.
    #[error("issuance deadline exceeded during {stage} stage")]
    DeadlineExceeded { stage: Stage },
}

impl IssuanceError {
    /// The stage the issuance failed in, when it reached a ledger at all.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            Self::InvalidDraft(_) => None,
            Self::Failed { stage, .. } | Self::DeadlineExceeded { stage } => Some(*stage),
        }
    }
}
