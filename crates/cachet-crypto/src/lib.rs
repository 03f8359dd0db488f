//! Cachet Crypto — Linkage commitment hashing and Ed25519 signing material
//! for ledger adapters.

pub mod error;
pub mod keys;
pub mod linkage;
pub mod signing;

pub use error::{CryptoError, LinkageError};
pub use keys::{KeyPair, PublicKey};
pub use linkage::{compute_linkage, verify_linkage};
pub use signing::{sign, verify, Signature};
