//! Periodic sync scheduler
//!
//! Runs one sync cycle immediately and then one per interval. A failed cycle
//! is logged and the next tick tries again.

use crate::engine::{SyncEngine, SyncStats};
use crate::error::Result;
use crate::http::PageFetcher;
use crate::kinds::KindId;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;

/// Interval-driven owner of a sync engine
pub struct Scheduler<F> {
    engine: SyncEngine<F>,
    interval: Duration,
}

impl<F: PageFetcher + 'static> Scheduler<F> {
    /// Create a scheduler running `engine` every `interval`
    pub fn new(engine: SyncEngine<F>, interval: Duration) -> Self {
        Self { engine, interval }
    }

    /// Get the engine
    pub fn engine(&self) -> &SyncEngine<F> {
        &self.engine
    }

    /// Spawn the scheduler loop. Runs until the handle is aborted.
    ///
    /// The first tick completes immediately, so a cycle runs at startup. Ticks
    /// missed while a long cycle is running are skipped, so cycles never overlap.
    pub fn start(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            tracing::info!(
                "Sync scheduler started, interval {}s",
                self.interval.as_secs()
            );
            let mut interval = tokio::time::interval(self.interval);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                interval.tick().await;

                if let Err(e) = self.run_cycle().await {
                    tracing::error!(%e, "Sync cycle failed");
                }
            }
        })
    }

    /// Run one cycle and log what the store holds afterwards
    pub async fn run_cycle(&self) -> Result<Vec<SyncStats>> {
        tracing::info!("Starting sync cycle");
        let stats = self.engine.sync_cycle().await?;

        for kind in KindId::ALL {
            let store = self.engine.store().clone();
            let collection = kind.collection();
            match crate::store::blocking(move || store.count(collection)).await {
                Ok(count) => tracing::info!("Total {} in store: {}", collection, count),
                Err(e) => tracing::warn!(%e, "Could not count {}", collection),
            }
        }

        tracing::info!("Sync cycle completed");
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ApiConfig;
    use crate::engine::SyncConfig;
    use crate::http::HttpClient;
    use crate::retry::RetryPolicy;
    use crate::store::KvStore;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mount_single_page(server: &MockServer, endpoint: &str, entities: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path(format!("/{endpoint}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "links": [
                    {"rel": "self", "href": "x"},
                    {"rel": "last", "href": "x"}
                ],
                "metadata": {"totalRecords": 1, "currentPageRecords": 1},
                "entities": entities
            })))
            .mount(server)
            .await;
    }

    fn scheduler(server: &MockServer, store: KvStore) -> Scheduler<HttpClient> {
        let client =
            HttpClient::new(ApiConfig::new(server.uri(), "auth", "client", "1")).unwrap();
        let config = SyncConfig::new()
            .with_retry(RetryPolicy::new(1, Duration::from_millis(1)))
            .with_page_delay(Duration::ZERO);
        let engine = SyncEngine::new(client, store).with_config(config);
        Scheduler::new(engine, Duration::from_secs(3600))
    }

    #[tokio::test]
    async fn test_run_cycle_syncs_every_kind() {
        let server = MockServer::start().await;
        mount_single_page(&server, "products", json!([{"sku": "A"}])).await;
        mount_single_page(&server, "Prices", json!([{"sku": "A", "sellPrice": "1"}])).await;

        let dir = tempfile::tempdir().unwrap();
        let scheduler = scheduler(&server, KvStore::new(dir.path().join("s.duckdb")));

        let stats = scheduler.run_cycle().await.unwrap();
        assert_eq!(stats.len(), 2);
        assert_eq!(scheduler.engine().store().count("prices").unwrap(), 1);
    }

    #[tokio::test]
    async fn test_start_runs_a_cycle_immediately() {
        let server = MockServer::start().await;
        mount_single_page(&server, "products", json!([{"sku": "A"}])).await;
        mount_single_page(&server, "Prices", json!([{"sku": "A"}])).await;

        let dir = tempfile::tempdir().unwrap();
        let store = KvStore::new(dir.path().join("s.duckdb"));
        let handle = Arc::new(scheduler(&server, store.clone())).start();

        let mut synced = false;
        for _ in 0..100 {
            tokio::time::sleep(Duration::from_millis(50)).await;
            if matches!(store.count("prices"), Ok(1)) {
                synced = true;
                break;
            }
        }
        handle.abort();
        assert!(synced, "startup cycle did not run");
    }

    #[tokio::test]
    async fn test_failed_cycle_does_not_stop_the_loop() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let scheduler = scheduler(&server, KvStore::new(dir.path().join("s.duckdb")));
        assert!(scheduler.run_cycle().await.is_err());

        let handle = Arc::new(scheduler).start();
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(!handle.is_finished());
        handle.abort();
    }
}
