//! Verification consensus engine.
//!
//! Fans out one `check_validity` per known record ref concurrently, waits
//! for every vote (a join barrier, not a race), and folds the outcomes into
//! a single verdict with a confidence tier. Verification never errors
//! outright: total unreachability is a verdict of tier none, not an
//! exception.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures::future::join_all;
use tokio::time::{timeout_at, Instant};

use cachet_core::config::CachetConfig;
use cachet_core::types::{
    ConsensusTier, ConsensusVerdict, LedgerRecordRef, LinkageHash, RecordPayload,
    VerificationOutcome,
};
use cachet_ledger::{AdapterError, AdapterRegistry, RetryError, RetryPolicy};

/// Recomputes a consensus verdict from live ledger state.
pub struct ConsensusEngine {
    registry: Arc<AdapterRegistry>,
    retry: RetryPolicy,
    deadline: Duration,
}

impl ConsensusEngine {
    /// Create an engine with default retry policy and a 10 second deadline.
    pub fn new(registry: Arc<AdapterRegistry>) -> Self {
        Self {
            registry,
            retry: RetryPolicy::default(),
            deadline: Duration::from_secs(10),
        }
    }

    /// Build an engine from the `[verification]` and `[retry]`
    /// configuration sections.
    pub fn from_config(registry: Arc<AdapterRegistry>, config: &CachetConfig) -> Self {
        Self {
            registry,
            retry: RetryPolicy::from_settings(&config.retry),
            deadline: Duration::from_secs(config.verification.deadline_secs),
        }
    }

    /// Replace the retry policy applied around every ledger call.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Set the overall deadline for one verification call.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    /// Ask every referenced ledger whether its record is currently valid
    /// and fold the answers into one verdict.
    ///
    /// Each check runs concurrently under its own retry loop; one ledger's
    /// retries never block another's. Any single confirmation makes the
    /// verdict valid; additional confirmations upgrade the tier and never
    /// flip the boolean. An adapter that errors or misses the deadline
    /// contributes "could not confirm", never "proven invalid". Outcome
    /// order follows the input ref order.
    pub async fn verify(&self, refs: &[LedgerRecordRef]) -> ConsensusVerdict {
        let deadline = Instant::now() + self.deadline;

        let checks = refs.iter().map(|target| self.check_one(target, deadline));
        let contributing = join_all(checks).await;

        let valid_count = contributing.iter().filter(|o| o.confirmed()).count();
        let tier = ConsensusTier::from_valid_count(valid_count);

        tracing::debug!(
            queried = contributing.len(),
            valid_count,
            tier = %tier,
            "consensus tally"
        );

        ConsensusVerdict {
            is_valid: valid_count > 0,
            tier,
            contributing,
        }
    }

    /// Fetch a shadow record and compare its embedded linkage commitment
    /// against an expected hash.
    ///
    /// Informational: binds a shadow record back to its primary without
    /// entering the [`verify`](Self::verify) tally.
    pub async fn cross_check_linkage(
        &self,
        shadow_ref: &LedgerRecordRef,
        expected: &LinkageHash,
    ) -> Result<bool, AdapterError> {
        let deadline = Instant::now() + self.deadline;

        let fetched = timeout_at(
            deadline,
            self.retry.run(|| {
                let registry = Arc::clone(&self.registry);
                let ledger = shadow_ref.ledger.clone();
                let record_id = shadow_ref.record_id.clone();
                async move { registry.get(&ledger)?.fetch(&record_id).await }
            }),
        )
        .await
        .map_err(|_| AdapterError::unavailable(&shadow_ref.ledger, "deadline exceeded"))?
        .map_err(RetryError::into_inner)?;

        match fetched.payload {
            RecordPayload::Shadow { linkage, .. } => Ok(linkage == *expected),
            other => {
                tracing::warn!(
                    ledger = %shadow_ref.ledger,
                    record_id = %shadow_ref.record_id,
                    kind = other.kind(),
                    "cross-check target is not a shadow record"
                );
                Ok(false)
            }
        }
    }

    /// One retried validity check against one ledger.
    async fn check_one(&self, target: &LedgerRecordRef, deadline: Instant) -> VerificationOutcome {
        let result = timeout_at(
            deadline,
            self.retry.run(|| {
                let registry = Arc::clone(&self.registry);
                let ledger = target.ledger.clone();
                let record_id = target.record_id.clone();
                async move { registry.get(&ledger)?.check_validity(&record_id).await }
            }),
        )
        .await;

        let (is_valid, error) = match result {
            Ok(Ok(valid)) => (valid, None),
            Ok(Err(e)) => {
                tracing::warn!(
                    ledger = %target.ledger,
                    record_id = %target.record_id,
                    error = %e,
                    "ledger could not confirm validity"
                );
                (false, Some(e.to_string()))
            }
            Err(_) => {
                tracing::warn!(
                    ledger = %target.ledger,
                    record_id = %target.record_id,
                    "verification deadline exceeded"
                );
                (false, Some("deadline exceeded".into()))
            }
        };

        VerificationOutcome {
            ledger: target.ledger.clone(),
            is_valid,
            checked_at: Utc::now(),
            error,
        }
    }
}
