//! Read-side response types

use crate::kinds::{PriceRecord, ProductRecord};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Catalog item joined with its price, as served to downstream consumers
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProductResponse {
    pub nombre: String,
    pub clave: String,
    pub categoria: String,
    pub modelo: String,
    pub costo: f64,
    pub costo2: f64,
    pub proveedor: String,
    #[serde(rename = "cantidadSillas")]
    pub cantidad_sillas: i64,
    #[serde(rename = "cantidadPorPaquete")]
    pub cantidad_por_paquete: i64,
    pub descontinuado: String,
    pub alto: f64,
    pub largo: f64,
    pub ancho: f64,
    pub peso: f64,
}

impl ProductResponse {
    /// Join one stored product with its price, if any
    pub fn merge(product: ProductRecord, price: Option<&PriceRecord>) -> Self {
        // Trimmed: the catalog feed never fills item_series, and an untrimmed
        // join would serve every model as " <seriesId>".
        let modelo = format!("{} {}", product.item_series, product.series_id)
            .trim()
            .to_string();
        let (costo, costo2) = price.map_or((0.0, 0.0), |p| (p.sell_price, p.total_net_price));

        Self {
            nombre: product.consumer_description,
            clave: product.sku,
            categoria: product.item_sales_category_code_key,
            modelo,
            costo,
            costo2,
            proveedor: product.supplier,
            cantidad_sillas: product.chair_qty_per_carton,
            cantidad_por_paquete: product.items_per_case,
            descontinuado: product.status,
            alto: product.unit_height_mm,
            largo: product.unit_width_mm,
            ancho: product.unit_depth_mm,
            peso: product.item_weight_kg,
        }
    }
}

/// Join every product with the price sharing its SKU.
///
/// Output follows product order; prices without a product are dropped.
pub fn merge_all(products: Vec<ProductRecord>, prices: Vec<PriceRecord>) -> Vec<ProductResponse> {
    let by_sku: HashMap<String, PriceRecord> =
        prices.into_iter().map(|p| (p.sku.clone(), p)).collect();

    products
        .into_iter()
        .map(|product| {
            let price = by_sku.get(&product.sku);
            ProductResponse::merge(product, price)
        })
        .collect()
}
