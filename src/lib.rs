// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::unused_self)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # catalog-sync
//!
//! Keeps a local copy of a supplier's product catalog and price list.
//!
//! A scheduler pulls every page of each entity kind from a paginated REST
//! API, transforms each page into its storage form and upserts it into a
//! DuckDB-backed key-value store keyed by SKU. A small HTTP server reads the
//! store back and serves products joined with their prices.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────┐   ┌────────────┐   ┌───────────┐   ┌───────────┐
//! │ Scheduler │──▶│ SyncEngine │──▶│   Kinds   │──▶│  KvStore  │
//! └───────────┘   └─────┬──────┘   │ transform │   └─────┬─────┘
//!                       │          └───────────┘         │
//!                 ┌─────┴──────┐                   ┌─────┴─────┐
//!                 │ HttpClient │                   │  Server   │
//!                 │  + retry   │                   │ /products │
//!                 └────────────┘                   └───────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use catalog_sync::{ApiConfig, HttpClient, KvStore, SyncEngine};
//!
//! let client = HttpClient::new(ApiConfig::new(base_url, auth, client_id, customer))?;
//! let engine = SyncEngine::new(client, KvStore::new("catalog.duckdb"));
//! let stats = engine.sync_cycle().await?;
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types
pub mod error;

/// Upstream entity model and page envelope
pub mod entity;

/// Entity kinds and their transforms
pub mod kinds;

/// HTTP client for the upstream API
pub mod http;

/// Retry with exponential backoff
pub mod retry;

/// DuckDB-backed key-value store
pub mod store;

/// Pagination driver
pub mod engine;

/// Interval scheduler
pub mod scheduler;

/// Read-side HTTP server
pub mod server;

/// Configuration
pub mod config;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use config::{ApiConfig, AppConfig};
pub use engine::{SyncConfig, SyncEngine, SyncStats};
pub use entity::{Entity, Link, Metadata, PageResponse};
pub use error::{Error, Result};
pub use http::{HttpClient, PageFetcher};
pub use kinds::{EntityKind, KindId, PriceKind, ProductKind};
pub use retry::{fetch_with_retry, RetryPolicy};
pub use scheduler::Scheduler;
pub use store::KvStore;
