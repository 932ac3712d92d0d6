//! Entity kind trait and registry

use crate::entity::Entity;
use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Diagnostics gathered while transforming wire entities
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransformReport {
    /// Numeric fields that could not be parsed and were stored as 0.0
    pub malformed_fields: usize,
}

impl TransformReport {
    /// Create an empty report
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one malformed field
    pub fn add_malformed(&mut self) {
        self.malformed_fields += 1;
    }
}

/// A kind of entity the sync engine can fetch, transform and persist.
///
/// Implementations are stateless descriptors; the engine is generic over them
/// so each kind keeps its own wire and storage types.
pub trait EntityKind: Clone + Send + Sync + 'static {
    /// Representation returned by the upstream API
    type Wire: Entity + DeserializeOwned + Send + 'static;
    /// Normalized representation written to the store
    type Stored: Entity + Serialize + DeserializeOwned + Send + 'static;

    /// Name of the local collection
    fn collection(&self) -> &'static str;

    /// Upstream endpoint path, relative to the API base URL
    fn endpoint(&self) -> &'static str;

    /// Query parameter carrying the customer number
    fn customer_param(&self) -> &'static str {
        "customer"
    }

    /// Map one wire entity to its storage form
    fn transform(&self, wire: Self::Wire, report: &mut TransformReport) -> Self::Stored;
}

/// Registered entity kinds, in sync order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KindId {
    /// Catalog items
    Products,
    /// Price records
    Prices,
}

impl KindId {
    /// Every registered kind, in the order a sync cycle runs them
    pub const ALL: [KindId; 2] = [KindId::Products, KindId::Prices];

    /// Collection name for this kind
    pub fn collection(self) -> &'static str {
        match self {
            KindId::Products => "products",
            KindId::Prices => "prices",
        }
    }
}

impl fmt::Display for KindId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.collection())
    }
}

impl FromStr for KindId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "products" | "product" => Ok(KindId::Products),
            "prices" | "price" => Ok(KindId::Prices),
            other => Err(Error::config(format!(
                "Unknown entity kind '{other}' (expected products or prices)"
            ))),
        }
    }
}
