//! Issuance orchestrator.
//!
//! Drives ledger adapters to turn one credential draft into a committed
//! multi-ledger result: an authoritative primary record, and optionally a
//! privacy-layer shadow record bound to it by a linkage commitment. Primary
//! failure is fatal; privacy failure degrades the result and never aborts.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{timeout_at, Instant};

use cachet_core::config::CachetConfig;
use cachet_core::types::{
    ConsensusHint, CredentialDraft, IssuancePolicy, IssuanceResult, LedgerId, LedgerRecordRef,
    LinkageHash, RecordPayload,
};
use cachet_crypto::compute_linkage;
use cachet_ledger::{AdapterError, AdapterRegistry, RetryError, RetryPolicy};

use crate::error::{IssuanceError, Stage};

/// Orchestrates one issuance across the registered ledgers.
///
/// Holds no per-issuance state: each [`issue`](Self::issue) call owns its
/// draft, policy, and result, so concurrent issuances never share mutable
/// data.
pub struct IssuanceOrchestrator {
    registry: Arc<AdapterRegistry>,
    retry: RetryPolicy,
    privacy_ledger: Option<LedgerId>,
    deadline: Duration,
}

impl IssuanceOrchestrator {
    /// Create an orchestrator with default retry policy, no privacy ledger,
    /// and a 30 second deadline.
    pub fn new(registry: Arc<AdapterRegistry>) -> Self {
        Self {
            registry,
            retry: RetryPolicy::default(),
            privacy_ledger: None,
            deadline: Duration::from_secs(30),
        }
    }

    /// Build an orchestrator from the `[issuance]` and `[retry]`
    /// configuration sections.
    pub fn from_config(registry: Arc<AdapterRegistry>, config: &CachetConfig) -> Self {
        Self {
            registry,
            retry: RetryPolicy::from_settings(&config.retry),
            privacy_ledger: config.privacy_ledger(),
            deadline: Duration::from_secs(config.issuance.deadline_secs),
        }
    }

    /// Replace the retry policy applied around every ledger call.
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Set the ledger that receives privacy-layer shadow records.
    pub fn with_privacy_ledger(mut self, ledger: LedgerId) -> Self {
        self.privacy_ledger = Some(ledger);
        self
    }

    /// Set the overall deadline for one issuance call.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = deadline;
        self
    }

    /// Issue a credential under the given policy.
    ///
    /// Writes the primary record first; a terminal failure or an exhausted
    /// retry budget there fails the whole issuance and nothing else is
    /// attempted. When the policy wants privacy, a shadow record follows on
    /// the configured privacy ledger; any failure on that path returns Ok
    /// with `privacy: None` and `hint: PrivacyDegraded` instead of erroring.
    pub async fn issue(
        &self,
        draft: CredentialDraft,
        policy: IssuancePolicy,
    ) -> Result<IssuanceResult, IssuanceError> {
        draft.validate()?;

        let deadline = Instant::now() + self.deadline;

        let primary_payload = RecordPayload::Credential(draft.clone());
        let primary = match timeout_at(
            deadline,
            self.submit_with_retry(&policy.primary, &primary_payload),
        )
        .await
        {
            Ok(Ok(primary)) => primary,
            Ok(Err(source)) => {
                return Err(IssuanceError::Failed {
                    stage: Stage::Primary,
                    source,
                });
            }
            Err(_) => {
                return Err(IssuanceError::DeadlineExceeded {
                    stage: Stage::Primary,
                });
            }
        };

        tracing::info!(
            ledger = %primary.ledger,
            record_id = %primary.record_id,
            "primary record committed"
        );

        let (privacy, linkage) = if policy.want_privacy {
            self.submit_shadow(&draft, &primary, deadline).await
        } else {
            (None, None)
        };

        let hint = if privacy.is_some() {
            ConsensusHint::MultiLedger
        } else if policy.want_privacy {
            ConsensusHint::PrivacyDegraded
        } else {
            ConsensusHint::PrimaryOnly
        };

        tracing::info!(
            ledger = %primary.ledger,
            record_id = %primary.record_id,
            hint = %hint,
            "issuance complete"
        );

        Ok(IssuanceResult {
            primary,
            privacy,
            linkage,
            hint,
        })
    }

    /// Privacy stage. Every failure path returns `(None, None)` after a
    /// warn log; a committed primary record is never discarded over a
    /// shadow.
    async fn submit_shadow(
        &self,
        draft: &CredentialDraft,
        primary: &LedgerRecordRef,
        deadline: Instant,
    ) -> (Option<LedgerRecordRef>, Option<LinkageHash>) {
        let privacy_ledger = match &self.privacy_ledger {
            Some(ledger) => ledger,
            None => {
                tracing::warn!("privacy requested but no privacy ledger configured");
                return (None, None);
            }
        };

        if *privacy_ledger == primary.ledger {
            tracing::warn!(
                ledger = %privacy_ledger,
                "privacy ledger equals primary ledger, skipping shadow record"
            );
            return (None, None);
        }

        let extra = draft
            .document_hash
            .as_deref()
            .map(str::as_bytes)
            .unwrap_or_default();
        let linkage = match compute_linkage(
            &draft.title,
            &draft.issuer,
            &draft.recipient,
            primary.record_id.as_str(),
            extra,
        ) {
            Ok(linkage) => linkage,
            Err(e) => {
                tracing::warn!(error = %e, "linkage computation failed, degrading privacy");
                return (None, None);
            }
        };

        let payload = RecordPayload::Shadow {
            recipient: draft.recipient.clone(),
            linkage,
        };

        match timeout_at(deadline, self.submit_with_retry(privacy_ledger, &payload)).await {
            Ok(Ok(shadow)) => {
                tracing::info!(
                    ledger = %shadow.ledger,
                    record_id = %shadow.record_id,
                    linkage = %linkage,
                    "shadow record committed"
                );
                (Some(shadow), Some(linkage))
            }
            Ok(Err(e)) => {
                tracing::warn!(
                    ledger = %privacy_ledger,
                    error = %e,
                    "shadow record failed, degrading privacy"
                );
                (None, None)
            }
            Err(_) => {
                tracing::warn!(
                    ledger = %privacy_ledger,
                    "deadline exceeded during shadow record, degrading privacy"
                );
                (None, None)
            }
        }
    }

    /// One retried submit against one ledger. A missing registration is
    /// terminal and surfaces on the first attempt.
    async fn submit_with_retry(
        &self,
        ledger: &LedgerId,
        payload: &RecordPayload,
    ) -> Result<LedgerRecordRef, RetryError<AdapterError>> {
        self.retry
            .run(|| {
                let registry = Arc::clone(&self.registry);
                let ledger = ledger.clone();
                let payload = payload.clone();
                async move { registry.get(&ledger)?.submit(&payload).await }
            })
            .await
    }
}
