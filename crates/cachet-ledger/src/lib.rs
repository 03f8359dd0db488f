//! Cachet Ledger Layer
//!
//! Provides the ledger adapter contract, the adapter registry, the shared
//! retry policy, and reference adapters (in-memory, HTTP gateway) for
//! publishing credential records to heterogeneous ledgers.

pub mod adapters;
pub mod error;
pub mod registry;
pub mod retry;
pub mod traits;

pub use error::{AdapterError, RetryError};
pub use registry::{registry_from_config, AdapterRegistry, Health, LedgerStatus, StatusReport};
pub use retry::{RetryPolicy, RetryableError};
pub use traits::{Connectivity, ILedger, LedgerRecord};
