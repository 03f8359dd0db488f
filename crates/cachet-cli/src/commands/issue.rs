//! `cachet issue` — issue a credential to the configured ledgers.

use std::sync::Arc;

use clap::Args;

use cachet_core::config::CachetConfig;
use cachet_core::types::{CredentialDraft, IssuancePolicy, LedgerId};
use cachet_issuance::IssuanceOrchestrator;
use cachet_ledger::registry_from_config;

#[derive(Args, Debug)]
pub struct IssueArgs {
    /// Credential title.
    #[arg(short, long)]
    pub title: String,

    /// Issuer display name.
    #[arg(short, long)]
    pub issuer: String,

    /// Recipient identifier (wallet address, DID, email hash).
    #[arg(short, long)]
    pub recipient: String,

    /// Content-addressed hash of a supporting document.
    #[arg(long)]
    pub document_hash: Option<String>,

    /// Primary ledger (defaults to the configured default ledger).
    #[arg(short, long)]
    pub ledger: Option<String>,

    /// Also write a privacy-layer shadow record.
    #[arg(short, long)]
    pub privacy: bool,

    /// Print the result as JSON.
    #[arg(long)]
    pub json: bool,
}

pub async fn run(config: &CachetConfig, args: &IssueArgs) -> anyhow::Result<()> {
    let registry = Arc::new(registry_from_config(config)?);
    let orchestrator = IssuanceOrchestrator::from_config(registry, config);

    let mut builder = CredentialDraft::builder()
        .title(args.title.clone())
        .issuer(args.issuer.clone())
        .recipient(args.recipient.clone());
    if let Some(hash) = &args.document_hash {
        builder = builder.document_hash(hash.clone());
    }
    let draft = builder.build()?;

    let primary = args
        .ledger
        .as_deref()
        .map(LedgerId::new)
        .unwrap_or_else(|| config.default_ledger());
    let mut policy = IssuancePolicy::new(primary);
    if args.privacy {
        policy = policy.with_privacy();
    }

    let result = orchestrator.issue(draft, policy).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    println!("Credential issued!");
    println!(
        "  Primary:   {} / {}",
        result.primary.ledger, result.primary.record_id
    );
    if let Some(url) = &result.primary.explorer_url {
        println!("  Explorer:  {}", url);
    }
    match &result.privacy {
        Some(shadow) => println!("  Privacy:   {} / {}", shadow.ledger, shadow.record_id),
        None => println!("  Privacy:   (none)"),
    }
    if let Some(linkage) = &result.linkage {
        println!("  Linkage:   {}", linkage);
    }
    println!("  Hint:      {}", result.hint);
    Ok(())
}
