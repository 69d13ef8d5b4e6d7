use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::sale::Sale;

/// Converts a minor-unit price (cents) to major units.
pub fn minor_to_major(minor: i64) -> f64 {
    minor as f64 / 100.0
}

/// A matched sale as handed to the notifier.
///
/// This is the only place the price leaves minor units: `sale_price` is in
/// major units (e.g. `20050` cents becomes `200.5`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotifiedSale {
    pub sale_id: i64,
    pub market_name: String,
    pub sale_price: f64,
    pub wear: Option<f64>,
    pub pattern: Option<i64>,
    pub exterior: Option<String>,
    pub category: Option<String>,

    /// Label of the first rule that matched.
    pub matched_rule: String,
    pub detected_at_ms: u64,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NotifiedSale {
    pub fn from_match(sale: Sale, matched_rule: impl Into<String>, detected_at_ms: u64) -> Self {
        Self {
            sale_id: sale.sale_id,
            market_name: sale.market_name,
            sale_price: minor_to_major(sale.sale_price),
            wear: sale.wear,
            pattern: sale.pattern,
            exterior: sale.exterior,
            category: sale.category,
            matched_rule: matched_rule.into(),
            detected_at_ms,
            extra: sale.extra,
        }
    }
}
