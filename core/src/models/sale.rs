use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::lenient;

/// The only event type eligible for matching.
pub const LISTED: &str = "listed";

/// One marketplace listing as sent by the sale feed.
///
/// `sale_price` stays in minor currency units (cents) for its whole life
/// inside the pipeline. Fields the pipeline does not interpret are kept in
/// `extra` and handed through to the notifier untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    #[serde(deserialize_with = "lenient::i64_from_any")]
    pub sale_id: i64,

    #[serde(default, deserialize_with = "lenient::string_or_null")]
    pub market_name: String,

    /// Minor units.
    #[serde(default, deserialize_with = "lenient::i64_from_any")]
    pub sale_price: i64,

    /// Float wear in [0, 1]; absent for items without a wear value.
    #[serde(default, deserialize_with = "lenient::opt_f64_from_any")]
    pub wear: Option<f64>,

    #[serde(default, deserialize_with = "lenient::opt_i64_from_any")]
    pub pattern: Option<i64>,

    #[serde(default)]
    pub exterior: Option<String>,

    #[serde(default)]
    pub category: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Sale {
    pub fn new(sale_id: i64, market_name: impl Into<String>, sale_price: i64) -> Self {
        Self {
            sale_id,
            market_name: market_name.into(),
            sale_price,
            wear: None,
            pattern: None,
            exterior: None,
            category: None,
            extra: Map::new(),
        }
    }
}

/// A feed entry: the event tag plus the sale it describes.
///
/// Decodes from the nested `{"eventType", "sale": {..}, "timestamp"}` shape
/// and from the flat shape with the sale fields next to `eventType`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawRecord")]
pub struct FeedRecord {
    pub event_type: String,
    pub sale: Sale,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
}

impl FeedRecord {
    pub fn listed(sale: Sale) -> Self {
        Self {
            event_type: LISTED.to_string(),
            sale,
            timestamp: None,
        }
    }

    pub fn is_listed(&self) -> bool {
        self.event_type == LISTED
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct NestedRecord {
    event_type: String,
    sale: Sale,
    #[serde(default, deserialize_with = "lenient::opt_i64_from_any")]
    timestamp: Option<i64>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FlatRecord {
    event_type: String,
    #[serde(default, deserialize_with = "lenient::opt_i64_from_any")]
    timestamp: Option<i64>,
    #[serde(flatten)]
    sale: Sale,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawRecord {
    Nested(NestedRecord),
    Flat(FlatRecord),
}

impl From<RawRecord> for FeedRecord {
    fn from(raw: RawRecord) -> Self {
        match raw {
            RawRecord::Nested(r) => Self {
                event_type: r.event_type,
                sale: r.sale,
                timestamp: r.timestamp,
            },
            RawRecord::Flat(r) => Self {
                event_type: r.event_type,
                sale: r.sale,
                timestamp: r.timestamp,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_nested_record_with_string_numbers() {
        let raw = r#"{
            "eventType": "listed",
            "sale": {
                "saleId": 61598590,
                "marketName": "Karambit Tiger Tooth",
                "category": "Knife",
                "salePrice": "200",
                "wear": "0.02453",
                "pattern": 231,
                "exterior": "Minimal Wear",
                "tags": [{"name": "Industrial Grade"}]
            },
            "timestamp": 1746650292048
        }"#;

        let rec: FeedRecord = serde_json::from_str(raw).unwrap();

        assert!(rec.is_listed());
        assert_eq!(rec.timestamp, Some(1746650292048));
        assert_eq!(rec.sale.sale_id, 61598590);
        assert_eq!(rec.sale.sale_price, 200);
        assert_eq!(rec.sale.wear, Some(0.02453));
        assert_eq!(rec.sale.pattern, Some(231));
        assert_eq!(rec.sale.category.as_deref(), Some("Knife"));
        assert!(rec.sale.extra.contains_key("tags"));
    }

    #[test]
    fn decodes_flat_record() {
        let raw = r#"{
            "eventType": "sold",
            "saleId": 7,
            "marketName": "AK-47 | Redline",
            "salePrice": 1234,
            "wear": null,
            "currency": "EUR"
        }"#;

        let rec: FeedRecord = serde_json::from_str(raw).unwrap();

        assert!(!rec.is_listed());
        assert_eq!(rec.sale.sale_id, 7);
        assert_eq!(rec.sale.sale_price, 1234);
        assert_eq!(rec.sale.wear, None);
        assert_eq!(rec.sale.pattern, None);
        assert_eq!(rec.sale.extra.get("currency"), Some(&Value::from("EUR")));
    }

    #[test]
    fn record_without_sale_id_is_rejected() {
        let raw = r#"{"eventType": "listed", "sale": {"marketName": "x"}}"#;
        assert!(serde_json::from_str::<FeedRecord>(raw).is_err());
    }
}
