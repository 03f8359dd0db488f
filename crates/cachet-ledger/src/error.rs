use cachet_core::types::{LedgerId, RecordId};

use crate::retry::RetryableError;

/// Ledger adapter errors.
#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    /// The ledger could not be asked: network failure, auth failure,
    /// missing configuration. Transient and retryable.
    #[error("ledger {ledger} unavailable: {reason}")]
    Unavailable { ledger: LedgerId, reason: String },

    /// The ledger was asked and said no: malformed input, insufficient
    /// authorization. Terminal; surfaced immediately.
    #[error("ledger {ledger} rejected the record: {reason}")]
    Rejected { ledger: LedgerId, reason: String },

    /// The record does not exist on the ledger. Distinct from
    /// `Unavailable` so "ledger says no" is never conflated with
    /// "couldn't ask the ledger".
    #[error("record not found on {ledger}: {record_id}")]
    NotFound { ledger: LedgerId, record_id: RecordId },

    #[error("ledger not registered: {0}")]
    NotRegistered(LedgerId),
}

impl AdapterError {
    /// Convenience constructor for unavailability.
    pub fn unavailable(ledger: &LedgerId, reason: impl Into<String>) -> Self {
        Self::Unavailable {
            ledger: ledger.clone(),
            reason: reason.into(),
        }
    }
}

impl RetryableError for AdapterError {
    fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }
}

/// A failed operation wrapped by the retry policy, with the attempt count
/// attached for observability.
#[derive(Debug, thiserror::Error)]
pub enum RetryError<E>
where
    E: std::error::Error + 'static,
{
    /// A terminal error short-circuited the retry loop.
    #[error("terminal failure on attempt {attempts}: {source}")]
    Terminal { attempts: u32, source: E },

    /// Every attempt failed with a retryable error.
    #[error("retries exhausted after {attempts} attempt(s): {source}")]
    Exhausted { attempts: u32, source: E },
}

impl<E> RetryError<E>
where
    E: std::error::Error + 'static,
{
    /// Number of attempts that were made.
    pub fn attempts(&self) -> u32 {
        match self {
            Self::Terminal { attempts, .. } | Self::Exhausted { attempts, .. } => *attempts,
        }
    }

    /// Consume the wrapper and return the last-seen error.
    pub fn into_inner(self) -> E {
        match self {
            Self::Terminal { source, .. } | Self::Exhausted { source, .. } => source,
        }
    }

    /// True when the retry budget ran out (as opposed to a terminal error).
    pub fn is_exhausted(&self) -> bool {
        matches!(self, Self::Exhausted { .. })
    }
}
