//! Price record kind

use super::types::{EntityKind, TransformReport};
use crate::entity::Entity;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Price record as returned by the upstream API; amounts arrive as strings
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Price {
    pub description: String,
    pub sku: String,
    pub base_price: String,
    pub sell_price: String,
    pub surcharge: String,
    pub fob_point: String,
    pub discount: String,
    pub dfi_discount: String,
    pub net_price_before_freight: String,
    pub freight: String,
    pub express_freight: String,
    pub total_net_price: String,
    pub container_price: String,
}

impl Entity for Price {
    fn sku(&self) -> &str {
        &self.sku
    }
}

/// Price record as stored locally, amounts parsed
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PriceRecord {
    pub description: String,
    pub sku: String,
    pub base_price: f64,
    pub sell_price: f64,
    pub surcharge: f64,
    pub fob_point: String,
    pub discount: f64,
    pub dfi_discount: f64,
    pub net_price_before_freight: f64,
    pub freight: f64,
    pub express_freight: f64,
    pub total_net_price: f64,
    pub container_price: f64,
}

impl Entity for PriceRecord {
    fn sku(&self) -> &str {
        &self.sku
    }
}

/// Price records: `GET /Prices`, stored in `prices`
#[derive(Debug, Clone, Copy, Default)]
pub struct PriceKind;

impl EntityKind for PriceKind {
    type Wire = Price;
    type Stored = PriceRecord;

    fn collection(&self) -> &'static str {
        "prices"
    }

    fn endpoint(&self) -> &'static str {
        "Prices"
    }

    fn customer_param(&self) -> &'static str {
        "Customer"
    }

    fn transform(&self, wire: Price, report: &mut TransformReport) -> PriceRecord {
        let sku = wire.sku.as_str();
        let mut amount = |field: &str, raw: &str| {
            parse_amount(raw).unwrap_or_else(|| {
                warn!(sku, field, raw, "Malformed amount stored as 0.0");
                report.add_malformed();
                0.0
            })
        };

        PriceRecord {
            base_price: amount("basePrice", &wire.base_price),
            sell_price: amount("sellPrice", &wire.sell_price),
            surcharge: amount("surcharge", &wire.surcharge),
            discount: amount("discount", &wire.discount),
            dfi_discount: amount("dfiDiscount", &wire.dfi_discount),
            net_price_before_freight: amount(
                "netPriceBeforeFreight",
                &wire.net_price_before_freight,
            ),
            freight: amount("freight", &wire.freight),
            express_freight: amount("expressFreight", &wire.express_freight),
            total_net_price: amount("totalNetPrice", &wire.total_net_price),
            container_price: amount("containerPrice", &wire.container_price),
            description: wire.description,
            sku: wire.sku,
            fob_point: wire.fob_point,
        }
    }
}

/// Parse a string amount.
///
/// An empty string is 0.0. Returns `None` for non-empty text that is not a
/// finite floating point number; NaN and infinities cannot be stored as JSON.
pub fn parse_amount(raw: &str) -> Option<f64> {
    if raw.is_empty() {
        return Some(0.0);
    }
    raw.parse::<f64>().ok().filter(|value| value.is_finite())
}
