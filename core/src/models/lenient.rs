//! Serde helpers for feed and rule fields that arrive either as JSON numbers
//! or as numeric strings (`"salePrice": "200"`, `"minWear": 0.1`).

use serde::de::Error;
use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum Scalar {
    Int(i64),
    Float(f64),
    Text(String),
    Bool(bool),
}

impl Scalar {
    fn into_i64<E: Error>(self) -> Result<i64, E> {
        match self {
            Scalar::Int(v) => Ok(v),
            Scalar::Float(f) if f.fract() == 0.0 && f.is_finite() => Ok(f as i64),
            Scalar::Float(f) => Err(E::custom(format!("expected integer, got {f}"))),
            Scalar::Text(s) => s
                .trim()
                .parse::<i64>()
                .map_err(|e| E::custom(format!("invalid integer {s:?}: {e}"))),
            Scalar::Bool(b) => Err(E::custom(format!("expected integer, got {b}"))),
        }
    }

    fn into_f64<E: Error>(self) -> Result<f64, E> {
        match self {
            Scalar::Int(v) => Ok(v as f64),
            Scalar::Float(f) => Ok(f),
            Scalar::Text(s) => s
                .trim()
                .parse::<f64>()
                .map_err(|e| E::custom(format!("invalid number {s:?}: {e}"))),
            Scalar::Bool(b) => Err(E::custom(format!("expected number, got {b}"))),
        }
    }

    /// Numeric zero and `false`. Text is never falsy here; blank text is
    /// handled by the filter engine.
    fn is_falsy(&self) -> bool {
        match self {
            Scalar::Int(v) => *v == 0,
            Scalar::Float(f) => *f == 0.0,
            Scalar::Bool(b) => !b,
            Scalar::Text(_) => false,
        }
    }

    fn into_text(self) -> String {
        match self {
            Scalar::Int(v) => v.to_string(),
            Scalar::Float(f) => f.to_string(),
            Scalar::Text(s) => s,
            Scalar::Bool(b) => b.to_string(),
        }
    }
}

/// Integer written as a number or a numeric string.
pub fn i64_from_any<'de, D>(d: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    Scalar::deserialize(d)?.into_i64()
}

/// Optional integer; `null` and a missing field both read as `None`.
pub fn opt_i64_from_any<'de, D>(d: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Scalar>::deserialize(d)?
        .map(Scalar::into_i64)
        .transpose()
}

/// Optional float; `null` and a missing field both read as `None`.
pub fn opt_f64_from_any<'de, D>(d: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Scalar>::deserialize(d)?
        .map(Scalar::into_f64)
        .transpose()
}

/// Rule values are kept as raw text; numbers are rendered back to text so the
/// filter engine parses every field the same way. A numeric `0` or `false`
/// reads as unset, the string `"0"` does not.
pub fn opt_text_from_any<'de, D>(d: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Scalar>::deserialize(d)?
        .filter(|v| !v.is_falsy())
        .map(Scalar::into_text))
}

/// String that may be `null` on the wire.
pub fn string_or_null<'de, D>(d: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(d)?.unwrap_or_default())
}
