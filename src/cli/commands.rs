//! CLI commands and argument parsing

use crate::kinds::KindId;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Catalog and pricing sync service
#[derive(Parser, Debug)]
#[command(name = "catalog-sync")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (YAML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Upstream API base URL
    #[arg(long, global = true, env = "CATALOG_SYNC_BASE_URL")]
    pub base_url: Option<String>,

    /// Authorization header value
    #[arg(long, global = true, env = "CATALOG_SYNC_AUTHORIZATION", hide_env_values = true)]
    pub authorization: Option<String>,

    /// Client_Id header value
    #[arg(long, global = true, env = "CATALOG_SYNC_CLIENT_ID")]
    pub client_id: Option<String>,

    /// Customer number
    #[arg(long, global = true, env = "CATALOG_SYNC_CUSTOMER")]
    pub customer: Option<String>,

    /// Store file (overrides store.path)
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the scheduler and serve the stored catalog over HTTP
    Serve {
        /// Port to listen on (overrides server.port)
        #[arg(short, long)]
        port: Option<u16>,

        /// Serve what is already stored without syncing
        #[arg(long)]
        no_sync: bool,
    },

    /// Run one sync cycle and exit
    Sync {
        /// Sync only this kind (products or prices)
        #[arg(long)]
        kind: Option<KindId>,
    },

    /// Print one stored record as JSON
    Get {
        /// Entity kind (products or prices)
        kind: KindId,

        /// SKU to look up
        sku: String,
    },

    /// Print stored entity counts per collection
    Count,
}

impl Cli {
    /// Tracing filter directives: `--verbose` forces `debug`, otherwise
    /// `RUST_LOG` is used as given, falling back to `info` when unset
    pub fn log_directives(&self, rust_log: Option<&str>) -> String {
        if self.verbose {
            return "debug".to_string();
        }
        match rust_log.map(str::trim) {
            Some(directives) if !directives.is_empty() => directives.to_string(),
            _ => "info".to_string(),
        }
    }
}
