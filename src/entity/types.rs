//! Entity and page envelope types

use serde::{Deserialize, Serialize};

/// Any record that can be stored and joined by its catalog SKU.
///
/// The SKU is the only identity concept in the system: it is the storage key
/// inside a collection and the join key between collections.
pub trait Entity {
    /// The entity's unique identifier
    fn sku(&self) -> &str;
}

/// A navigation link in a page response
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Link {
    /// Relation name (`self`, `next`, `last`, ...)
    #[serde(default)]
    pub rel: String,
    /// Target URL
    #[serde(default)]
    pub href: String,
}

impl Link {
    /// Create a new link
    pub fn new(rel: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            rel: rel.into(),
            href: href.into(),
        }
    }
}

/// Record counts reported by the upstream API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    /// Total records across all pages
    #[serde(default)]
    pub total_records: u64,
    /// Records on this page
    #[serde(default)]
    pub current_page_records: u64,
}

/// One page of a paginated listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageResponse<T> {
    /// Navigation links, in the order the API returned them
    #[serde(default)]
    pub links: Vec<Link>,
    /// Record counts
    #[serde(default)]
    pub metadata: Metadata,
    /// Wire entities on this page
    #[serde(default = "Vec::new")]
    pub entities: Vec<T>,
}

impl<T> PageResponse<T> {
    /// Create a page from its parts
    pub fn new(links: Vec<Link>, metadata: Metadata, entities: Vec<T>) -> Self {
        Self {
            links,
            metadata,
            entities,
        }
    }

    /// Href of the link with the given relation, compared case-insensitively.
    ///
    /// When a relation appears more than once the last occurrence wins.
    pub fn link(&self, rel: &str) -> Option<&str> {
        self.links
            .iter()
            .rev()
            .find(|link| link.rel.eq_ignore_ascii_case(rel))
            .map(|link| link.href.as_str())
    }

    /// Whether the `self` and `last` links point at the same URL.
    ///
    /// Both links must be present and non-empty. A page missing either one is
    /// never considered last by this rule.
    pub fn is_last_page(&self) -> bool {
        match (self.link("self"), self.link("last")) {
            (Some(current), Some(last)) => !current.is_empty() && current == last,
            _ => false,
        }
    }

    /// Number of entities on this page
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Check if the page carries no entities
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
