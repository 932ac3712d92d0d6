//! Entity model
//!
//! The shared contract every fetchable record satisfies, plus the generic
//! page envelope the upstream API wraps them in.
//!
//! # Overview
//!
//! - `Entity` - anything with a stable SKU
//! - `PageResponse<T>` - one page of wire entities with navigation links
//! - `Link` / `Metadata` - the envelope parts

mod types;

pub use types::{Entity, Link, Metadata, PageResponse};
