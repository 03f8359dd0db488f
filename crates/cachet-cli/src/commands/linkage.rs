//! `cachet linkage` — compute a linkage commitment hash.
//!
//! Operator debugging aid: recompute the hash a shadow record should carry
//! and compare it to what a ledger actually holds.

use clap::Args;

use cachet_crypto::compute_linkage;

#[derive(Args, Debug)]
pub struct LinkageArgs {
    /// Credential title.
    #[arg(short, long)]
    pub title: String,

    /// Issuer display name.
    #[arg(short, long)]
    pub issuer: String,

    /// Recipient identifier.
    #[arg(short, long)]
    pub recipient: String,

    /// Issuance context (usually the primary record id).
    #[arg(short, long)]
    pub context: String,

    /// Extra bound bytes, e.g. a document hash.
    #[arg(long, default_value = "")]
    pub extra: String,
}

pub fn run(args: &LinkageArgs) -> anyhow::Result<()> {
    let hash = compute_linkage(
        &args.title,
        &args.issuer,
        &args.recipient,
        &args.context,
        args.extra.as_bytes(),
    )?;
    println!("{}", hash);
    Ok(())
}
