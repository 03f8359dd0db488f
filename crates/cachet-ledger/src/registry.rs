//! Explicit adapter registry.
//!
//! Constructed once at startup (usually from configuration) and passed by
//! `Arc` into the orchestrator and the consensus engine. There is no lazy
//! per-ledger singleton; a ledger that is not registered is an explicit
//! [`AdapterError::NotRegistered`].

use std::collections::HashMap;
use std::fmt;

use futures::future::join_all;
use serde::{Deserialize, Serialize};

use cachet_core::config::CachetConfig;
use cachet_core::error::CoreError;
use cachet_core::types::LedgerId;

use crate::adapters::{GatewayLedger, MemoryLedger};
use crate::error::AdapterError;
use crate::traits::ILedger;

/// Registry of ledger adapters, keyed by ledger id.
pub struct AdapterRegistry {
    adapters: HashMap<LedgerId, Box<dyn ILedger>>,
}

impl AdapterRegistry {
    /// Create a registry with no adapters.
    pub fn new() -> Self {
        Self {
            adapters: HashMap::new(),
        }
    }

    /// Register an adapter, keyed by its `ledger_id()`.
    ///
    /// Registering a second adapter under the same id replaces the first.
    pub fn register_adapter(&mut self, adapter: Box<dyn ILedger>) {
        let id = adapter.ledger_id().clone();
        tracing::info!(ledger = %id, "registering ledger adapter");
        self.adapters.insert(id, adapter);
    }

    /// Remove an adapter by ledger id.
    pub fn unregister_adapter(&mut self, id: &LedgerId) -> Option<Box<dyn ILedger>> {
        self.adapters.remove(id)
    }

    /// Look up an adapter by ledger id.
    pub fn get(&self, id: &LedgerId) -> Result<&dyn ILedger, AdapterError> {
        self.adapters
            .get(id)
            .map(|a| a.as_ref())
            .ok_or_else(|| AdapterError::NotRegistered(id.clone()))
    }

    /// Whether an adapter is registered for the given ledger.
    pub fn contains(&self, id: &LedgerId) -> bool {
        self.adapters.contains_key(id)
    }

    /// All registered ledger ids, sorted.
    pub fn ledger_ids(&self) -> Vec<LedgerId> {
        let mut ids: Vec<LedgerId> = self.adapters.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Number of registered adapters.
    pub fn count(&self) -> usize {
        self.adapters.len()
    }

    /// Poll every adapter's connectivity concurrently and aggregate.
    pub async fn status_report(&self) -> StatusReport {
        let mut entries: Vec<_> = self.adapters.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));

        let polls = entries.into_iter().map(|(id, adapter)| async move {
            let connectivity = adapter.connectivity().await;
            LedgerStatus {
                ledger: id.clone(),
                reachable: connectivity.reachable,
                detail: connectivity.detail,
            }
        });
        let ledgers = join_all(polls).await;

        let reachable = ledgers.iter().filter(|l| l.reachable).count();
        let health = if reachable == ledgers.len() && !ledgers.is_empty() {
            Health::Operational
        } else if reachable > 0 {
            Health::Degraded
        } else {
            Health::Down
        };

        StatusReport { health, ledgers }
    }
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Overall health across all registered ledgers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Health {
    /// Every registered ledger is reachable.
    Operational,
    /// Some ledgers are reachable, some are not.
    Degraded,
    /// No ledger is reachable.
    Down,
}

impl fmt::Display for Health {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Operational => write!(f, "operational"),
            Self::Degraded => write!(f, "degraded"),
            Self::Down => write!(f, "down"),
        }
    }
}

/// Connectivity of one registered ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerStatus {
    pub ledger: LedgerId,
    pub reachable: bool,
    pub detail: String,
}

/// Aggregated connectivity across the registry, ledgers sorted by id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusReport {
    pub health: Health,
    pub ledgers: Vec<LedgerStatus>,
}

/// Build a registry from the `[ledgers.*]` configuration sections.
///
/// Unknown adapter kinds are a configuration error, never a silent skip.
pub fn registry_from_config(config: &CachetConfig) -> Result<AdapterRegistry, CoreError> {
    let mut registry = AdapterRegistry::new();

    for (name, ledger_config) in &config.ledgers {
        let id = LedgerId::new(name.clone());
        match ledger_config.kind.as_str() {
            "memory" => {
                registry.register_adapter(Box::new(MemoryLedger::new(id)));
            }
            "gateway" => {
                registry.register_adapter(Box::new(GatewayLedger::from_config(id, ledger_config)));
            }
            other => {
                return Err(CoreError::Config(format!(
                    "ledger '{}' has unknown kind '{}'",
                    name, other
                )));
            }
        }
    }

    Ok(registry)
}
