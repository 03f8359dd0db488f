//! Cachet CLI — operator interface for the multi-ledger credential
//! orchestrator.
//!
//! Subcommands: init, issue, verify, status, linkage.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cachet_core::config::CachetConfig;

/// Cachet — multi-ledger credential issuance and verification.
#[derive(Parser, Debug)]
#[command(name = "cachet", version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(long, global = true, default_value = "cachet.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Write a commented default configuration file.
    Init(commands::init::InitArgs),
    /// Issue a credential to the configured ledgers.
    Issue(commands::issue::IssueArgs),
    /// Recompute a consensus verdict for committed records.
    Verify(commands::verify::VerifyArgs),
    /// Report connectivity of every registered ledger.
    Status(commands::status::StatusArgs),
    /// Compute a linkage commitment hash.
    Linkage(commands::linkage::LinkageArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = CachetConfig::load(&cli.config)?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match &cli.command {
        Commands::Init(args) => commands::init::run(&cli.config, args),
        Commands::Issue(args) => commands::issue::run(&config, args).await,
        Commands::Verify(args) => commands::verify::run(&config, args).await,
        Commands::Status(args) => commands::status::run(&config, args).await,
        Commands::Linkage(args) => commands::linkage::run(args),
    }
}
