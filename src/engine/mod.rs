//! Sync engine module
//!
//! Drives the fetch → transform → persist loop for each entity kind.
//!
//! # Overview
//!
//! The engine module provides:
//! - `SyncEngine` - paginates one kind into its collection, or a whole cycle
//! - `SyncConfig` - retry policy, page delay and page bound
//! - `SyncStats` - per-kind totals

mod types;

pub use types::{SyncConfig, SyncStats};

use crate::error::{Error, Result};
use crate::http::PageFetcher;
use crate::kinds::{EntityKind, KindId, PriceKind, ProductKind, TransformReport};
use crate::retry::fetch_with_retry;
use crate::store::{blocking, KvStore};
use std::time::Instant;
use tracing::{info, warn};

/// Sync engine for pulling entity kinds into the local store
pub struct SyncEngine<F> {
    /// Page source
    fetcher: F,
    /// Destination store
    store: KvStore,
    /// Sync configuration
    config: SyncConfig,
}

impl<F: PageFetcher> SyncEngine<F> {
    /// Create a new sync engine
    pub fn new(fetcher: F, store: KvStore) -> Self {
        Self {
            fetcher,
            store,
            config: SyncConfig::default(),
        }
    }

    /// Set sync configuration
    #[must_use]
    pub fn with_config(mut self, config: SyncConfig) -> Self {
        self.config = config;
        self
    }

    /// Get the store
    pub fn store(&self) -> &KvStore {
        &self.store
    }

    /// Run every registered kind in order, stopping at the first failure
    pub async fn sync_cycle(&self) -> Result<Vec<SyncStats>> {
        let mut all = Vec::with_capacity(KindId::ALL.len());
        for kind in KindId::ALL {
            info!("Starting {} fetch...", kind);
            let stats = self.sync_kind(kind).await?;
            info!("{} fetched successfully!", kind);
            all.push(stats);
        }
        Ok(all)
    }

    /// Sync one registered kind
    pub async fn sync_kind(&self, kind: KindId) -> Result<SyncStats> {
        match kind {
            KindId::Products => self.sync_all(&ProductKind).await,
            KindId::Prices => self.sync_all(&PriceKind).await,
        }
    }

    /// Fetch every page of `kind` and upsert it into the kind's collection.
    ///
    /// Pages are strictly sequential: page N+1 is requested only after page
    /// N has been committed. The loop stops when the page's `self` and `last`
    /// links match, when a page comes back empty, or fails once more than
    /// `max_pages` pages have been fetched.
    pub async fn sync_all<K: EntityKind>(&self, kind: &K) -> Result<SyncStats> {
        let start = Instant::now();
        let collection = kind.collection();
        let endpoint = kind.endpoint();
        let mut stats = SyncStats::new(collection);

        let store = self.store.clone();
        blocking(move || store.ensure_collection(collection)).await?;

        let mut page = 1u32;
        loop {
            if page > self.config.max_pages {
                return Err(Error::PageLimitExceeded {
                    collection: collection.to_string(),
                    max_pages: self.config.max_pages,
                });
            }

            info!("Fetching {} page {}...", endpoint, page);
            let label = format!("{endpoint} page {page}");
            let response = fetch_with_retry(&self.config.retry, &label, || {
                self.fetcher.fetch_page(kind, page)
            })
            .await
            .map_err(|e| page_error(collection, page, e))?;

            let is_last = response.is_last_page();
            let count = response.entities.len();
            stats.total_records_reported = response.metadata.total_records;

            let store = self.store.clone();
            let page_kind = kind.clone();
            let entities = response.entities;
            let report = blocking(move || {
                let mut report = TransformReport::new();
                store.write_batch(collection, entities, |wire| {
                    page_kind.transform(wire, &mut report)
                })?;
                Ok(report)
            })
            .await
            .map_err(|e| page_error(collection, page, e))?;

            stats.add_page(count);
            stats.add_malformed(report.malformed_fields);
            if report.malformed_fields > 0 {
                warn!(
                    "Page {}: {} malformed amounts in {} stored as 0.0",
                    page, report.malformed_fields, endpoint
                );
            }
            info!(
                "Page {}: {} {} processed. Total: {}",
                page, count, endpoint, stats.records_synced
            );

            if is_last {
                info!(
                    "Reached last page. Total {} processed: {}",
                    endpoint, stats.records_synced
                );
                break;
            }

            if count == 0 {
                warn!(
                    "Page {} of {} was empty without self/last links matching; stopping",
                    page, endpoint
                );
                break;
            }

            page += 1;
            tokio::time::sleep(self.config.page_delay).await;
        }

        stats.finish(start.elapsed());
        Ok(stats)
    }
}

/// Wrap a page-level failure with the collection and page it happened on
fn page_error(collection: &str, page: u32, source: Error) -> Error {
    Error::Page {
        collection: collection.to_string(),
        page,
        source: Box::new(source),
    }
}
