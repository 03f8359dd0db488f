//! Reference ledger adapters.

pub mod gateway;
pub mod memory;

pub use gateway::GatewayLedger;
pub use memory::MemoryLedger;
