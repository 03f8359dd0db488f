//! `cachet init` — write a commented default configuration file.

use std::path::Path;

use clap::Args;

/// Commented configuration template written by `cachet init`.
const DEFAULT_CONFIG: &str = r#"# Cachet configuration.

[issuance]
# Ledger receiving primary records when the caller does not choose one.
default_ledger = "mainline"
# Ledger receiving privacy-layer shadow records; leave commented out to
# disable the privacy layer.
# privacy_ledger = "zk-mirror"
deadline_secs = 30

[verification]
deadline_secs = 10

[retry]
max_attempts = 3
backoff_base_ms = 1000
max_delay_ms = 30000
jitter = 0.0

[logging]
level = "info"

# One [ledgers.<id>] section per ledger. kind is "memory" or "gateway".
[ledgers.mainline]
kind = "memory"

# [ledgers.zk-mirror]
# kind = "gateway"
# endpoint = "http://127.0.0.1:8545"
# auth_token = ""
# explorer_base = "https://scan.example"
"#;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Overwrite an existing configuration file.
    #[arg(long)]
    pub force: bool,
}

pub fn run(path: &Path, args: &InitArgs) -> anyhow::Result<()> {
    if path.exists() && !args.force {
        anyhow::bail!(
            "{} already exists; pass --force to overwrite",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(path, DEFAULT_CONFIG)?;

    println!("Wrote default configuration to {}", path.display());
    println!("Edit the [ledgers.*] sections to register your ledgers.");
    Ok(())
}
