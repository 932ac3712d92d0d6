//! DuckDB-backed key-value collections

use crate::entity::Entity;
use crate::error::{Error, Result};
use duckdb::{params, Connection};
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock, Mutex, TryLockError};
use std::time::{Duration, Instant};
use tracing::debug;

/// Default time to wait for the store file lock
pub const DEFAULT_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(3);

/// Pause between attempts to open a locked store
const ACQUIRE_RETRY_INTERVAL: Duration = Duration::from_millis(50);

/// Valid collection names; they become part of a table name
static COLLECTION_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][a-z0-9_]*$").expect("valid collection name regex"));

/// Handle to the on-disk store.
///
/// The database is opened once, on first use, and shared by every clone of
/// the handle. Each operation works on its own connection to that shared
/// instance, so a reader running alongside a batch write sees either none or
/// all of the batch. Handles created separately for the same file do not
/// share an instance; clone one handle instead.
#[derive(Clone)]
pub struct KvStore {
    path: PathBuf,
    acquire_timeout: Duration,
    db: Arc<Mutex<Option<Connection>>>,
}

impl std::fmt::Debug for KvStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KvStore")
            .field("path", &self.path)
            .field("acquire_timeout", &self.acquire_timeout)
            .finish_non_exhaustive()
    }
}

impl KvStore {
    /// Create a handle to the store at `path` with the default acquisition timeout.
    ///
    /// Nothing is opened until the first operation.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self::with_timeout(path, DEFAULT_ACQUIRE_TIMEOUT)
    }

    /// Create a handle with a custom acquisition timeout
    pub fn with_timeout(path: impl AsRef<Path>, acquire_timeout: Duration) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            acquire_timeout,
            db: Arc::new(Mutex::new(None)),
        }
    }

    /// Path of the database file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create a collection if it does not exist yet
    pub fn ensure_collection(&self, name: &str) -> Result<()> {
        let table = table_name(name)?;
        let conn = self.connect()?;
        conn.execute_batch(&format!(
            "CREATE TABLE IF NOT EXISTS {table} (key VARCHAR PRIMARY KEY, value VARCHAR NOT NULL);"
        ))
        .map_err(|e| Error::storage(format!("Failed to create collection '{name}': {e}")))?;
        debug!("Collection '{}' ready", name);
        Ok(())
    }

    /// Transform and upsert a batch of entities in one transaction.
    ///
    /// Entities are keyed by their SKU; when the batch holds a SKU twice the
    /// later entity wins. Any serialization or write failure rolls back the
    /// whole batch. Returns the number of distinct keys written.
    pub fn write_batch<W, S, F>(&self, name: &str, entities: Vec<W>, mut transform: F) -> Result<usize>
    where
        W: Entity,
        S: Serialize,
        F: FnMut(W) -> S,
    {
        let table = table_name(name)?;

        let mut rows: Vec<(String, String)> = Vec::with_capacity(entities.len());
        let mut positions: HashMap<String, usize> = HashMap::with_capacity(entities.len());
        for entity in entities {
            let key = entity.sku().to_string();
            let value = serde_json::to_string(&transform(entity)).map_err(|e| {
                Error::storage(format!("error marshaling entity {key}: {e}"))
            })?;
            match positions.get(&key) {
                Some(&index) => rows[index].1 = value,
                None => {
                    positions.insert(key.clone(), rows.len());
                    rows.push((key, value));
                }
            }
        }

        let mut conn = self.connect()?;
        let tx = conn
            .transaction()
            .map_err(|e| Error::storage(format!("Failed to begin transaction: {e}")))?;
        {
            let mut stmt = tx
                .prepare(&format!(
                    "INSERT OR REPLACE INTO {table} (key, value) VALUES (?, ?)"
                ))
                .map_err(|e| Error::storage(format!("Failed to prepare upsert: {e}")))?;
            for (key, value) in &rows {
                stmt.execute(params![key, value])
                    .map_err(|e| Error::storage(format!("error saving entity {key}: {e}")))?;
            }
        }
        tx.commit()
            .map_err(|e| Error::storage(format!("Failed to commit batch to '{name}': {e}")))?;

        Ok(rows.len())
    }

    /// Look up one entity by SKU
    pub fn read_one<T: DeserializeOwned>(&self, name: &str, id: &str) -> Result<T> {
        let table = table_name(name)?;
        let conn = self.connect()?;
        require_collection(&conn, name)?;

        let value: String = match conn.query_row(
            &format!("SELECT value FROM {table} WHERE key = ?"),
            params![id],
            |row| row.get(0),
        ) {
            Ok(value) => value,
            Err(duckdb::Error::QueryReturnedNoRows) => return Err(Error::not_found(name, id)),
            Err(e) => {
                return Err(Error::storage(format!(
                    "Failed to read '{id}' from '{name}': {e}"
                )))
            }
        };

        Ok(serde_json::from_str(&value)?)
    }

    /// Read every entity in a collection, ordered by SKU
    pub fn read_all<T: DeserializeOwned>(&self, name: &str) -> Result<Vec<T>> {
        let table = table_name(name)?;
        let conn = self.connect()?;
        require_collection(&conn, name)?;

        let mut stmt = conn
            .prepare(&format!("SELECT value FROM {table} ORDER BY key"))
            .map_err(|e| Error::storage(format!("Failed to prepare scan of '{name}': {e}")))?;
        let values = stmt
            .query_map([], |row| row.get::<_, String>(0))
            .map_err(|e| Error::storage(format!("Failed to scan '{name}': {e}")))?;

        let mut entities = Vec::new();
        for value in values {
            let value =
                value.map_err(|e| Error::storage(format!("Failed to read row of '{name}': {e}")))?;
            entities.push(serde_json::from_str(&value)?);
        }
        Ok(entities)
    }

    /// Number of entities in a collection
    pub fn count(&self, name: &str) -> Result<usize> {
        let table = table_name(name)?;
        let conn = self.connect()?;
        require_collection(&conn, name)?;

        let count: i64 = conn
            .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
                row.get(0)
            })
            .map_err(|e| Error::storage(format!("Failed to count '{name}': {e}")))?;
        Ok(count as usize)
    }

    /// Get a connection to the shared database instance, opening it on first
    /// use. Waits up to the acquisition timeout for the handle and, when
    /// another process holds the file, for its lock.
    fn connect(&self) -> Result<Connection> {
        let deadline = Instant::now() + self.acquire_timeout;
        let mut db = loop {
            match self.db.try_lock() {
                Ok(guard) => break guard,
                Err(TryLockError::Poisoned(_)) => {
                    return Err(Error::storage(format!(
                        "Store handle for {} is poisoned",
                        self.path.display()
                    )))
                }
                Err(TryLockError::WouldBlock) if Instant::now() < deadline => {
                    std::thread::sleep(Duration::from_millis(1));
                }
                Err(TryLockError::WouldBlock) => {
                    return Err(self.unavailable("timed out waiting for the store handle"))
                }
            }
        };

        if db.is_none() {
            *db = Some(self.open(deadline)?);
        }
        match db.as_ref() {
            Some(conn) => conn
                .try_clone()
                .map_err(|e| Error::storage(format!("Failed to open connection: {e}"))),
            None => Err(self.unavailable("store was not opened")),
        }
    }

    /// Open the database file, retrying while another process holds its lock
    fn open(&self, deadline: Instant) -> Result<Connection> {
        loop {
            match Connection::open(&self.path) {
                Ok(conn) => {
                    debug!("Opened store {}", self.path.display());
                    return Ok(conn);
                }
                Err(e) if is_lock_conflict(&e) && Instant::now() < deadline => {
                    debug!("Store {} is locked, retrying: {}", self.path.display(), e);
                    std::thread::sleep(ACQUIRE_RETRY_INTERVAL);
                }
                Err(e) => return Err(self.unavailable(&e.to_string())),
            }
        }
    }

    fn unavailable(&self, message: &str) -> Error {
        Error::StoreUnavailable {
            path: self.path.display().to_string(),
            timeout_ms: self.acquire_timeout.as_millis() as u64,
            message: message.to_string(),
        }
    }
}

/// Table backing a collection
fn table_name(collection: &str) -> Result<String> {
    if !COLLECTION_NAME.is_match(collection) {
        return Err(Error::config(format!(
            "Invalid collection name '{collection}' (expected lowercase letters, digits and '_')"
        )));
    }
    Ok(format!("kv_{collection}"))
}

/// Fail with `CollectionNotFound` unless the collection's table exists
fn require_collection(conn: &Connection, name: &str) -> Result<()> {
    let table = table_name(name)?;
    let exists: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM information_schema.tables WHERE table_name = ?",
            params![table],
            |row| row.get(0),
        )
        .map_err(|e| Error::storage(format!("Failed to look up collection '{name}': {e}")))?;

    if exists == 0 {
        return Err(Error::CollectionNotFound {
            collection: name.to_string(),
        });
    }
    Ok(())
}

/// Whether an open failure is another process holding the file
fn is_lock_conflict(err: &duckdb::Error) -> bool {
    let message = err.to_string().to_lowercase();
    message.contains("lock") || message.contains("conflict")
}
