//! Engine types
//!
//! Configuration and statistics for the sync engine.

use crate::config::SyncSettings;
use crate::retry::RetryPolicy;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::time::Duration;

/// Configuration for sync operation
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Retry policy applied to every page fetch
    pub retry: RetryPolicy,
    /// Pause between consecutive pages
    pub page_delay: Duration,
    /// Maximum pages fetched per kind before the sync is abandoned
    pub max_pages: u32,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::default(),
            page_delay: Duration::from_millis(100),
            max_pages: 10_000,
        }
    }
}

impl SyncConfig {
    /// Create a new sync config
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the retry policy
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Set the delay between pages
    #[must_use]
    pub fn with_page_delay(mut self, delay: Duration) -> Self {
        self.page_delay = delay;
        self
    }

    /// Set the page bound
    #[must_use]
    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages;
        self
    }
}

impl From<&SyncSettings> for SyncConfig {
    fn from(settings: &SyncSettings) -> Self {
        Self {
            retry: RetryPolicy::new(
                settings.max_attempts,
                Duration::from_millis(settings.backoff_base_ms),
            ),
            page_delay: Duration::from_millis(settings.page_delay_ms),
            max_pages: settings.max_pages,
        }
    }
}

/// Statistics from syncing one entity kind
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SyncStats {
    /// Collection that was synced
    pub collection: String,
    /// Pages fetched
    pub pages_fetched: u32,
    /// Entities processed across all pages
    pub records_synced: usize,
    /// Total the upstream API reported on the last page
    pub total_records_reported: u64,
    /// Numeric fields stored as 0.0 because they could not be parsed
    pub malformed_fields: usize,
    /// Duration in milliseconds
    pub duration_ms: u64,
    /// When the sync finished
    pub finished_at: Option<DateTime<Utc>>,
}

impl SyncStats {
    /// Create empty stats for a collection
    pub fn new(collection: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            pages_fetched: 0,
            records_synced: 0,
            total_records_reported: 0,
            malformed_fields: 0,
            duration_ms: 0,
            finished_at: None,
        }
    }

    /// Add a page with `records` entities
    pub fn add_page(&mut self, records: usize) {
        self.pages_fetched += 1;
        self.records_synced += records;
    }

    /// Add malformed field occurrences
    pub fn add_malformed(&mut self, count: usize) {
        self.malformed_fields += count;
    }

    /// Mark the sync finished after `duration`
    pub fn finish(&mut self, duration: Duration) {
        self.duration_ms = duration.as_millis() as u64;
        self.finished_at = Some(Utc::now());
    }
}
