//! Workspace configuration loading and management.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::error::CoreError;
use crate::types::LedgerId;

/// Full configuration for a Cachet deployment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachetConfig {
    /// Issuance orchestrator settings.
    #[serde(default)]
    pub issuance: IssuanceConfig,

    /// Verification consensus engine settings.
    #[serde(default)]
    pub verification: VerificationConfig,

    /// Retry policy applied around every ledger call.
    #[serde(default)]
    pub retry: RetrySettings,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Registered ledgers, keyed by ledger id.
    #[serde(default = "default_ledgers")]
    pub ledgers: BTreeMap<String, LedgerConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuanceConfig {
    /// Ledger used for primary records when the caller does not choose one.
    #[serde(default = "default_ledger_name")]
    pub default_ledger: String,
    /// Ledger receiving privacy-layer shadow records; absent disables the
    /// privacy layer entirely.
    #[serde(default)]
    pub privacy_ledger: Option<String>,
    /// Overall deadline for one issuance call, in seconds.
    #[serde(default = "default_issue_deadline_secs")]
    pub deadline_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationConfig {
    /// Overall deadline for one verification call, in seconds.
    #[serde(default = "default_verify_deadline_secs")]
    pub deadline_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrySettings {
    /// Total attempts per ledger call (1 = no retries).
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Base delay for exponential backoff, in milliseconds.
    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,
    /// Cap on any single backoff delay, in milliseconds.
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,
    /// Jitter factor in [0.0, 1.0]; 0.0 keeps backoff deterministic.
    #[serde(default)]
    pub jitter: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

/// Configuration for one registered ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Adapter kind: "memory" or "gateway".
    #[serde(default = "default_ledger_kind")]
    pub kind: String,
    /// Gateway endpoint URL. A gateway without one reports itself
    /// unavailable instead of pretending to write.
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Optional bearer token for the gateway.
    #[serde(default)]
    pub auth_token: Option<String>,
    /// Optional base URL for browsable explorer references.
    #[serde(default)]
    pub explorer_base: Option<String>,
}

// Default value functions
fn default_ledger_name() -> String {
    "mainline".into()
}
fn default_issue_deadline_secs() -> u64 {
    30
}
fn default_verify_deadline_secs() -> u64 {
    10
}
fn default_max_attempts() -> u32 {
    3
}
fn default_backoff_base_ms() -> u64 {
    1000
}
fn default_max_delay_ms() -> u64 {
    30_000
}
fn default_log_level() -> String {
    "info".into()
}
fn default_ledger_kind() -> String {
    "memory".into()
}
fn default_ledgers() -> BTreeMap<String, LedgerConfig> {
    let mut ledgers = BTreeMap::new();
    ledgers.insert(default_ledger_name(), LedgerConfig::default());
    ledgers
}

impl Default for CachetConfig {
    fn default() -> Self {
        Self {
            issuance: IssuanceConfig::default(),
            verification: VerificationConfig::default(),
            retry: RetrySettings::default(),
            logging: LoggingConfig::default(),
            ledgers: default_ledgers(),
        }
    }
}

impl Default for IssuanceConfig {
    fn default() -> Self {
        Self {
            default_ledger: default_ledger_name(),
            privacy_ledger: None,
            deadline_secs: default_issue_deadline_secs(),
        }
    }
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            deadline_secs: default_verify_deadline_secs(),
        }
    }
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            backoff_base_ms: default_backoff_base_ms(),
            max_delay_ms: default_max_delay_ms(),
            jitter: 0.0,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            kind: default_ledger_kind(),
            endpoint: None,
            auth_token: None,
            explorer_base: None,
        }
    }
}

impl CachetConfig {
    /// Load config from a TOML file, falling back to defaults for missing
    /// fields. A missing file yields the full default config.
    pub fn load(path: &Path) -> Result<Self, CoreError> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            let config: CachetConfig = toml::from_str(&contents)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save the current config to a TOML file.
    pub fn save(&self, path: &Path) -> Result<(), CoreError> {
        let contents = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// The configured privacy ledger, if any.
    pub fn privacy_ledger(&self) -> Option<LedgerId> {
        self.issuance
            .privacy_ledger
            .as_deref()
            .map(LedgerId::new)
    }

    /// The default primary ledger.
    pub fn default_ledger(&self) -> LedgerId {
        LedgerId::new(self.issuance.default_ledger.clone())
    }
}
