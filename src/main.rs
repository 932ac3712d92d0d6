//! catalog-sync CLI
//!
//! Periodic catalog and pricing sync with a read-only HTTP view

use anyhow::Context;
use catalog_sync::cli::{Cli, Runner};
use clap::Parser;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(cli.log_directives(rust_log.as_deref())))
        .init();

    Runner::new(cli)
        .run()
        .await
        .context("catalog-sync failed")?;

    Ok(())
}
