//! `cachet status` — report connectivity of every registered ledger.

use clap::Args;

use cachet_core::config::CachetConfig;
use cachet_ledger::registry_from_config;

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Print the report as JSON.
    #[arg(long)]
    pub json: bool,
}

pub async fn run(config: &CachetConfig, args: &StatusArgs) -> anyhow::Result<()> {
    let registry = registry_from_config(config)?;
    let report = registry.status_report().await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Registry health: {}", report.health);
    for ledger in &report.ledgers {
        let state = if ledger.reachable { "up" } else { "down" };
        println!("  - {}: {} ({})", ledger.ledger, state, ledger.detail);
    }
    Ok(())
}
