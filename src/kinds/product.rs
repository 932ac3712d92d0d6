//! Catalog item kind

use super::types::{EntityKind, TransformReport};
use crate::entity::Entity;
use serde::{Deserialize, Serialize};

/// Supplier tag stamped on every stored catalog item
pub const SUPPLIER: &str = "Ashley Furniture";

/// Catalog item as returned by the upstream API
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Product {
    pub consumer_description: String,
    pub sku: String,
    pub item_sales_category_code_key: String,
    pub series_id: String,
    pub chair_qty_per_carton: i64,
    pub items_per_case: i64,
    pub status: String,
    pub unit_height_mm: f64,
    pub unit_width_mm: f64,
    pub unit_depth_mm: f64,
    pub item_weight_kg: f64,
}

impl Entity for Product {
    fn sku(&self) -> &str {
        &self.sku
    }
}

/// Catalog item as stored locally.
///
/// `item_series`, `price`, `sell_price` and `total_net_price` are part of the
/// stored schema but are not populated from the catalog feed.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductRecord {
    pub consumer_description: String,
    pub sku: String,
    pub item_sales_category_code_key: String,
    pub item_series: String,
    pub series_id: String,
    pub price: f64,
    pub sell_price: f64,
    pub total_net_price: f64,
    pub supplier: String,
    pub chair_qty_per_carton: i64,
    pub items_per_case: i64,
    pub status: String,
    pub unit_height_mm: f64,
    pub unit_width_mm: f64,
    pub unit_depth_mm: f64,
    pub item_weight_kg: f64,
}

impl Entity for ProductRecord {
    fn sku(&self) -> &str {
        &self.sku
    }
}

/// Catalog items: `GET /products`, stored in `products`
#[derive(Debug, Clone, Copy, Default)]
pub struct ProductKind;

impl EntityKind for ProductKind {
    type Wire = Product;
    type Stored = ProductRecord;

    fn collection(&self) -> &'static str {
        "products"
    }

    fn endpoint(&self) -> &'static str {
        "products"
    }

    fn transform(&self, wire: Product, _report: &mut TransformReport) -> ProductRecord {
        ProductRecord {
            consumer_description: wire.consumer_description,
            sku: wire.sku,
            item_sales_category_code_key: wire.item_sales_category_code_key,
            series_id: wire.series_id,
            supplier: SUPPLIER.to_string(),
            chair_qty_per_carton: wire.chair_qty_per_carton,
            items_per_case: wire.items_per_case,
            status: wire.status,
            unit_height_mm: wire.unit_height_mm,
            unit_width_mm: wire.unit_width_mm,
            unit_depth_mm: wire.unit_depth_mm,
            item_weight_kg: wire.item_weight_kg,
            ..ProductRecord::default()
        }
    }
}
