//! Typed constraints compiled from the raw text fields of a [`FilterRule`].
//!
//! Every populated rule field becomes exactly one [`Constraint`]. A field
//! whose value does not parse compiles to [`Constraint::Skipped`], which
//! always answers [`Check::NotApplicable`] instead of rejecting the sale.

use std::cmp::Ordering;

use corelib::{FilterRule, Sale};
use tracing::debug;

/// Wear substituted for a sale without wear when checking `minWear`.
pub const MISSING_WEAR_FOR_MIN: f64 = 1.0;
/// Wear substituted for a sale without wear when checking `maxWear`.
pub const MISSING_WEAR_FOR_MAX: f64 = 0.0;

/// Outcome of a single constraint against a sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    Pass,
    Fail,
    NotApplicable,
}

impl Check {
    pub fn rejects(self) -> bool {
        self == Check::Fail
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    Min,
    Max,
}

/// Sale fields compared by case-insensitive equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextField {
    Exterior,
    Category,
}

impl TextField {
    fn read(self, sale: &Sale) -> &str {
        let v = match self {
            TextField::Exterior => &sale.exterior,
            TextField::Category => &sale.category,
        };
        v.as_deref().unwrap_or("")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    /// Inclusive bound on the minor-unit price.
    PriceBound { bound: Bound, limit: i64 },
    /// Inclusive bound on the float wear.
    WearBound { bound: Bound, limit: f64 },
    PatternAllowlist(Vec<i64>),
    /// Lowercased term that must appear whole in the market name.
    NameContains(String),
    /// Lowercased terms; any one appearing in the market name is enough.
    NameContainsAny(Vec<String>),
    /// Lowercased expected value.
    ExactMatch { field: TextField, expected: String },
    /// Rule field present but unparsable.
    Skipped { field: &'static str, raw: String },
}

impl Constraint {
    pub fn check(&self, sale: &Sale) -> Check {
        let ok = match self {
            Constraint::PriceBound { bound, limit } => match bound {
                Bound::Min => sale.sale_price >= *limit,
                Bound::Max => sale.sale_price <= *limit,
            },
            Constraint::WearBound { bound, limit } => match bound {
                Bound::Min => {
                    sale.wear.unwrap_or(MISSING_WEAR_FOR_MIN).partial_cmp(limit)
                        != Some(Ordering::Less)
                }
                Bound::Max => {
                    sale.wear.unwrap_or(MISSING_WEAR_FOR_MAX).partial_cmp(limit)
                        != Some(Ordering::Greater)
                }
            },
            Constraint::PatternAllowlist(allowed) => sale
                .pattern
                .map(|p| allowed.contains(&p))
                .unwrap_or(false),
            Constraint::NameContains(term) => sale.market_name.to_lowercase().contains(term),
            Constraint::NameContainsAny(terms) => {
                let name = sale.market_name.to_lowercase();
                terms.iter().any(|t| name.contains(t.as_str()))
            }
            Constraint::ExactMatch { field, expected } => {
                field.read(sale).to_lowercase() == *expected
            }
            Constraint::Skipped { .. } => return Check::NotApplicable,
        };

        if ok { Check::Pass } else { Check::Fail }
    }
}

/// Compiles every populated field of `rule`, in a fixed field order.
///
/// Blank values impose no constraint and produce nothing.
pub fn compile(rule: &FilterRule) -> Vec<Constraint> {
    let mut out = Vec::new();

    if let Some(raw) = populated(&rule.min_price) {
        out.push(price(Bound::Min, "minPrice", raw));
    }
    if let Some(raw) = populated(&rule.max_price) {
        out.push(price(Bound::Max, "maxPrice", raw));
    }
    if let Some(raw) = populated(&rule.name) {
        out.push(Constraint::NameContains(raw.trim().to_lowercase()));
    }
    if let Some(raw) = populated(&rule.names) {
        out.push(Constraint::NameContainsAny(
            raw.split(',').map(|t| t.trim().to_lowercase()).collect(),
        ));
    }
    if let Some(raw) = populated(&rule.patterns) {
        out.push(patterns(raw));
    }
    if let Some(raw) = populated(&rule.min_wear) {
        out.push(wear(Bound::Min, "minWear", raw));
    }
    if let Some(raw) = populated(&rule.max_wear) {
        out.push(wear(Bound::Max, "maxWear", raw));
    }
    if let Some(raw) = populated(&rule.exterior) {
        out.push(Constraint::ExactMatch {
            field: TextField::Exterior,
            expected: raw.trim().to_lowercase(),
        });
    }
    if let Some(raw) = populated(&rule.category) {
        out.push(Constraint::ExactMatch {
            field: TextField::Category,
            expected: raw.trim().to_lowercase(),
        });
    }

    out
}

fn populated(v: &Option<String>) -> Option<&str> {
    v.as_deref().filter(|s| !s.trim().is_empty())
}

fn skipped(field: &'static str, raw: &str) -> Constraint {
    debug!(field, raw, "unparsable rule value; constraint not applied");
    Constraint::Skipped {
        field,
        raw: raw.to_string(),
    }
}

fn price(bound: Bound, field: &'static str, raw: &str) -> Constraint {
    match raw.trim().parse::<i64>() {
        Ok(limit) => Constraint::PriceBound { bound, limit },
        Err(_) => skipped(field, raw),
    }
}

fn wear(bound: Bound, field: &'static str, raw: &str) -> Constraint {
    match raw.trim().parse::<f64>() {
        Ok(limit) => Constraint::WearBound { bound, limit },
        Err(_) => skipped(field, raw),
    }
}

fn patterns(raw: &str) -> Constraint {
    let parsed: Result<Vec<i64>, _> = raw.split(',').map(|p| p.trim().parse::<i64>()).collect();
    match parsed {
        Ok(list) => Constraint::PatternAllowlist(list),
        Err(_) => skipped("patterns", raw),
    }
}
