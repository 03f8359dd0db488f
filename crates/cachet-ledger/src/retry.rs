//! Bounded retry with exponential backoff.
//!
//! Every ledger call in the orchestrator and the consensus engine runs
//! through a [`RetryPolicy`]. Transient errors are retried with
//! `backoff_base * 2^attempt` delays (capped); terminal errors short-circuit
//! on the first occurrence without consuming the remaining attempts.

use std::future::Future;
use std::time::Duration;

use rand::Rng;

use cachet_core::config::RetrySettings;

use crate::error::RetryError;

/// Classifies an error as transient (worth retrying) or terminal.
pub trait RetryableError {
    /// True when another attempt could plausibly succeed.
    fn is_retryable(&self) -> bool;
}

/// Bounded retry policy with exponential backoff.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts per operation (1 = no retries).
    pub max_attempts: u32,
    /// Base delay; attempt `n` (0-indexed) waits `backoff_base * 2^n`.
    pub backoff_base: Duration,
    /// Cap on any single delay.
    pub max_delay: Duration,
    /// Jitter factor in [0.0, 1.0]; 0.0 keeps backoff deterministic.
    pub jitter: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_base: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            jitter: 0.0,
        }
    }
}

impl RetryPolicy {
    /// Create a policy with the given attempt budget and backoff base.
    pub fn new(max_attempts: u32, backoff_base: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff_base,
            ..Self::default()
        }
    }

    /// A policy with zero delays, for tests and local adapters.
    pub fn no_backoff(max_attempts: u32) -> Self {
        Self::new(max_attempts, Duration::ZERO)
    }

    /// Build a policy from the `[retry]` configuration section.
    pub fn from_settings(settings: &RetrySettings) -> Self {
        Self {
            max_attempts: settings.max_attempts.max(1),
            backoff_base: Duration::from_millis(settings.backoff_base_ms),
            max_delay: Duration::from_millis(settings.max_delay_ms),
            jitter: settings.jitter.clamp(0.0, 1.0),
        }
    }

    /// Cap any single delay.
    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    /// Add a random jitter component to each delay.
    pub fn with_jitter(mut self, jitter: f64) -> Self {
        self.jitter = jitter.clamp(0.0, 1.0);
        self
    }

    /// Delay before the retry following attempt `attempt` (0-indexed).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let base = self.backoff_base.as_secs_f64() * 2f64.powi(attempt as i32);
        let capped = base.min(self.max_delay.as_secs_f64());

        let delayed = if self.jitter > 0.0 {
            let spread = capped * self.jitter;
            let offset = rand::thread_rng().gen_range(-spread..=spread);
            (capped + offset).max(0.0)
        } else {
            capped
        };

        Duration::from_secs_f64(delayed)
    }

    /// Run `operation` under this policy.
    ///
    /// Retries only errors whose [`RetryableError::is_retryable`] is true.
    /// Terminal errors return [`RetryError::Terminal`] immediately; an
    /// exhausted budget returns [`RetryError::Exhausted`] carrying the
    /// last-seen error and the attempt count.
    pub async fn run<F, Fut, T, E>(&self, mut operation: F) -> Result<T, RetryError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: RetryableError + std::error::Error + 'static,
    {
        let mut attempts = 0;

        loop {
            attempts += 1;

            match operation().await {
                Ok(value) => return Ok(value),
                Err(e) if !e.is_retryable() => {
                    return Err(RetryError::Terminal {
                        attempts,
                        source: e,
                    });
                }
                Err(e) => {
                    if attempts >= self.max_attempts {
                        return Err(RetryError::Exhausted {
                            attempts,
                            source: e,
                        });
                    }

                    let delay = self.delay_for_attempt(attempts - 1);
                    tracing::warn!(
                        attempt = attempts,
                        max_attempts = self.max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "ledger call failed, will retry"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}
