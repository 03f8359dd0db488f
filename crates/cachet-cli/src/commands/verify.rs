//! `cachet verify` — recompute a consensus verdict for committed records.

use std::sync::Arc;

use clap::Args;

use cachet_core::config::CachetConfig;
use cachet_core::types::{LedgerId, LedgerRecordRef, RecordId};
use cachet_issuance::ConsensusEngine;
use cachet_ledger::registry_from_config;

#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Ledger id; repeat for each record (paired with --record by position).
    #[arg(short, long = "ledger", required = true)]
    pub ledgers: Vec<String>,

    /// Record id; repeat for each ledger (paired with --ledger by position).
    #[arg(short, long = "record", required = true)]
    pub records: Vec<String>,

    /// Print the verdict as JSON.
    #[arg(long)]
    pub json: bool,
}

pub async fn run(config: &CachetConfig, args: &VerifyArgs) -> anyhow::Result<()> {
    if args.ledgers.len() != args.records.len() {
        anyhow::bail!(
            "got {} --ledger and {} --record values; they pair by position",
            args.ledgers.len(),
            args.records.len()
        );
    }

    let refs: Vec<LedgerRecordRef> = args
        .ledgers
        .iter()
        .zip(args.records.iter())
        .map(|(ledger, record)| LedgerRecordRef {
            ledger: LedgerId::new(ledger.clone()),
            record_id: RecordId::new(record.clone()),
            proof: Vec::new(),
            explorer_url: None,
        })
        .collect();

    let registry = Arc::new(registry_from_config(config)?);
    let engine = ConsensusEngine::from_config(registry, config);
    let verdict = engine.verify(&refs).await;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&verdict)?);
        return Ok(());
    }

    println!("Consensus verdict:");
    println!("  Valid:     {}", if verdict.is_valid { "yes" } else { "no" });
    println!("  Tier:      {}", verdict.tier);
    println!(
        "  Confirmed: {}/{}",
        verdict.valid_count(),
        verdict.contributing.len()
    );
    for outcome in &verdict.contributing {
        match &outcome.error {
            None if outcome.is_valid => println!("  - {}: valid", outcome.ledger),
            None => println!("  - {}: revoked or superseded", outcome.ledger),
            Some(e) => println!("  - {}: unconfirmed ({})", outcome.ledger, e),
        }
    }
    Ok(())
}
