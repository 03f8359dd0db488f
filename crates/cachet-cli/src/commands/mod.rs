//! Subcommand implementations.

pub mod init;
pub mod issue;
pub mod linkage;
pub mod status;
pub mod verify;
