//! receita - today's healthy snack recipe for every member
//!
//! receita provides:
//! - A daily recipe resolved through a local cache, a shared cache and a generator
//! - Same-day reuse without network calls
//! - One shared recipe per calendar day across devices
//! - Unified output format (jsonl/json/md)

use anyhow::Result;
use clap::Parser;

mod cache;
mod cli;
mod core;
mod flows;
mod generate;
mod pipeline;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    cli::init_logging(&cli);
    cli::run(cli).await
}
