use serde::de::Error;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::lenient;

/// A named set of optional match criteria, as written to the filter file.
///
/// Values are kept as raw text: a value that does not parse is not an error
/// here, the filter engine simply does not apply that constraint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterRule {
    /// Single term; the whole term must appear in the market name.
    #[serde(
        default,
        deserialize_with = "lenient::opt_text_from_any",
        skip_serializing_if = "Option::is_none"
    )]
    pub name: Option<String>,

    /// Comma-separated terms; any one of them must appear in the market name.
    #[serde(
        default,
        deserialize_with = "lenient::opt_text_from_any",
        skip_serializing_if = "Option::is_none"
    )]
    pub names: Option<String>,

    #[serde(
        default,
        alias = "min_price",
        deserialize_with = "lenient::opt_text_from_any",
        skip_serializing_if = "Option::is_none"
    )]
    pub min_price: Option<String>,

    #[serde(
        default,
        alias = "max_price",
        deserialize_with = "lenient::opt_text_from_any",
        skip_serializing_if = "Option::is_none"
    )]
    pub max_price: Option<String>,

    /// Comma-separated integer allowlist.
    #[serde(
        default,
        deserialize_with = "lenient::opt_text_from_any",
        skip_serializing_if = "Option::is_none"
    )]
    pub patterns: Option<String>,

    #[serde(
        default,
        alias = "min_wear",
        deserialize_with = "lenient::opt_text_from_any",
        skip_serializing_if = "Option::is_none"
    )]
    pub min_wear: Option<String>,

    #[serde(
        default,
        alias = "max_wear",
        deserialize_with = "lenient::opt_text_from_any",
        skip_serializing_if = "Option::is_none"
    )]
    pub max_wear: Option<String>,

    #[serde(
        default,
        deserialize_with = "lenient::opt_text_from_any",
        skip_serializing_if = "Option::is_none"
    )]
    pub exterior: Option<String>,

    #[serde(
        default,
        deserialize_with = "lenient::opt_text_from_any",
        skip_serializing_if = "Option::is_none"
    )]
    pub category: Option<String>,
}

impl FilterRule {
    /// Human-facing identity of the rule, if it carries one.
    pub fn label(&self) -> Option<&str> {
        [&self.name, &self.names]
            .into_iter()
            .flatten()
            .map(|s| s.trim())
            .find(|s| !s.is_empty())
    }
}

/// The filter file, in either of its two accepted shapes.
///
/// - current: `{"filters": [rule, ...]}`
/// - legacy: a single rule object
///
/// A document mixing both (a `filters` key next to rule keys) is rejected.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterConfig {
    Multi(Vec<FilterRule>),
    Single(FilterRule),
}

impl FilterConfig {
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_str(raw)?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, serde_json::Error> {
        let Value::Object(mut map) = value else {
            return Err(serde_json::Error::custom(
                "filter config must be a JSON object",
            ));
        };

        match map.remove("filters") {
            Some(_) if !map.is_empty() => Err(serde_json::Error::custom(format!(
                "filter config mixes \"filters\" with rule keys: {}",
                map.keys().cloned().collect::<Vec<_>>().join(", ")
            ))),
            Some(filters) => Ok(Self::Multi(serde_json::from_value(filters)?)),
            None => Ok(Self::Single(serde_json::from_value(Value::Object(map))?)),
        }
    }

    /// Flattens both shapes into an ordered rule list; the legacy shape
    /// becomes a one-element list.
    pub fn into_rules(self) -> Vec<FilterRule> {
        match self {
            Self::Multi(rules) => rules,
            Self::Single(rule) => vec![rule],
        }
    }
}
