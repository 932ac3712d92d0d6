//! Entity kinds and the transform stage
//!
//! Each kind of synced record (catalog item, price record) pairs a wire type
//! with a storage type and knows where it lives upstream and locally.
//!
//! # Overview
//!
//! - `EntityKind` - the capability set the sync engine drives
//! - `ProductKind` / `PriceKind` - the two registered kinds
//! - `KindId` - static registry the sync cycle iterates
//! - `TransformReport` - diagnostics collected while transforming a page

mod price;
mod product;
mod types;

pub use price::{parse_amount, Price, PriceKind, PriceRecord};
pub use product::{Product, ProductKind, ProductRecord, SUPPLIER};
pub use types::{EntityKind, KindId, TransformReport};
