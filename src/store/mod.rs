//! Key-value store module
//!
//! A single DuckDB file holding one collection (table) per entity kind. Each
//! collection maps a SKU to the JSON-encoded storage entity.
//!
//! The database is opened once per `KvStore` and shared by its clones. Each
//! operation takes its own connection and drops it when it finishes, so the
//! HTTP read path only ever sees committed batches from the sync engine.

mod engine;

pub use engine::{KvStore, DEFAULT_ACQUIRE_TIMEOUT};

use crate::error::{Error, Result};

/// Run a blocking store operation on the blocking thread pool
pub async fn blocking<T, F>(op: F) -> Result<T>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(op)
        .await
        .map_err(|e| Error::storage(format!("Store task failed: {e}")))?
}
