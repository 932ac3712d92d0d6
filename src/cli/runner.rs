//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands};
use crate::config::AppConfig;
use crate::engine::{SyncConfig, SyncEngine};
use crate::error::{Error, Result};
use crate::http::HttpClient;
use crate::kinds::KindId;
use crate::scheduler::Scheduler;
use crate::server;
use crate::store::{blocking, KvStore};
use serde_json::{json, Map, Value};
use std::sync::Arc;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        let config = self.load_config()?;

        match &self.cli.command {
            Commands::Serve { port, no_sync } => {
                self.serve(&config, port.unwrap_or(config.server.port), *no_sync)
                    .await
            }
            Commands::Sync { kind } => self.sync(&config, *kind).await,
            Commands::Get { kind, sku } => self.get(&config, *kind, sku).await,
            Commands::Count => self.count(&config).await,
        }
    }

    /// Load the config file (if any) and apply CLI/environment overrides
    fn load_config(&self) -> Result<AppConfig> {
        let mut config = match &self.cli.config {
            Some(path) => AppConfig::from_file(path)?,
            None => AppConfig::default(),
        };
        self.apply_overrides(&mut config);
        Ok(config)
    }

    fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(base_url) = &self.cli.base_url {
            config.api.base_url.clone_from(base_url);
        }
        if let Some(authorization) = &self.cli.authorization {
            config.api.authorization = Some(authorization.clone());
        }
        if let Some(client_id) = &self.cli.client_id {
            config.api.client_id.clone_from(client_id);
        }
        if let Some(customer) = &self.cli.customer {
            config.api.customer.clone_from(customer);
        }
        if let Some(store) = &self.cli.store {
            config.store.path.clone_from(store);
        }
    }

    fn open_store(config: &AppConfig) -> KvStore {
        KvStore::with_timeout(&config.store.path, config.store.acquire_timeout())
    }

    /// Build the engine writing into `store`; the server must read through
    /// a clone of the same handle
    fn build_engine(config: &AppConfig, store: KvStore) -> Result<SyncEngine<HttpClient>> {
        config.validate()?;
        let client = HttpClient::new(config.api.to_api_config()?)?;
        Ok(SyncEngine::new(client, store)
            .with_config(SyncConfig::from(&config.sync)))
    }

    async fn serve(&self, config: &AppConfig, port: u16, no_sync: bool) -> Result<()> {
        let store = Self::open_store(config);

        let scheduler = if no_sync {
            tracing::info!("Sync disabled; serving stored data only");
            None
        } else {
            let engine = Self::build_engine(config, store.clone())?;
            let scheduler = Arc::new(Scheduler::new(engine, config.sync.interval()));
            Some(scheduler.start())
        };

        let result = server::serve(store, port).await;
        if let Some(handle) = scheduler {
            handle.abort();
        }
        result
    }

    async fn sync(&self, config: &AppConfig, kind: Option<KindId>) -> Result<()> {
        let engine = Self::build_engine(config, Self::open_store(config))?;

        let stats = match kind {
            Some(kind) => vec![engine.sync_kind(kind).await?],
            None => engine.sync_cycle().await?,
        };

        for s in &stats {
            tracing::info!(
                "{}: {} records in {} pages ({} malformed amounts) in {}ms",
                s.collection,
                s.records_synced,
                s.pages_fetched,
                s.malformed_fields,
                s.duration_ms
            );
        }
        println!("{}", serde_json::to_string_pretty(&stats)?);
        Ok(())
    }

    async fn get(&self, config: &AppConfig, kind: KindId, sku: &str) -> Result<()> {
        let store = Self::open_store(config);
        let id = sku.to_string();
        let record: Value = blocking(move || store.read_one(kind.collection(), &id)).await?;
        println!("{}", serde_json::to_string_pretty(&record)?);
        Ok(())
    }

    async fn count(&self, config: &AppConfig) -> Result<()> {
        let counts = collection_counts(&Self::open_store(config)).await?;
        println!("{}", serde_json::to_string_pretty(&counts)?);
        Ok(())
    }
}

/// Stored entity count for every registered kind; unsynced kinds count as 0
async fn collection_counts(store: &KvStore) -> Result<Value> {
    let mut counts = Map::new();
    for kind in KindId::ALL {
        let store = store.clone();
        let collection = kind.collection();
        let count = match blocking(move || store.count(collection)).await {
            Ok(count) => count,
            Err(Error::CollectionNotFound { .. }) => 0,
            Err(e) => return Err(e),
        };
        counts.insert(collection.to_string(), json!(count));
    }
    Ok(Value::Object(counts))
}
