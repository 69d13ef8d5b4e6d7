//! Filter engine.
//!
//! A [`FilterSet`] is an ordered list of compiled rules combined with OR
//! semantics: a listed sale matches the set when any rule accepts it, and the
//! first accepting rule (in insertion order) is the one reported.

use corelib::{FeedRecord, FilterRule};
use tracing::trace;

use crate::constraint::{self, Check, Constraint};

/// A rule with its fields compiled into typed constraints.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledRule {
    label: String,
    rule: FilterRule,
    constraints: Vec<Constraint>,
}

impl CompiledRule {
    /// `position` is only used to label rules that carry no name.
    pub fn new(rule: FilterRule, position: usize) -> Self {
        let label = rule
            .label()
            .map(str::to_string)
            .unwrap_or_else(|| format!("rule #{}", position + 1));
        let constraints = constraint::compile(&rule);

        Self {
            label,
            rule,
            constraints,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn rule(&self) -> &FilterRule {
        &self.rule
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// True when the rule accepts every listed sale: it has no constraints,
    /// or every one of them was skipped as unparsable.
    pub fn is_open(&self) -> bool {
        self.constraints
            .iter()
            .all(|c| matches!(c, Constraint::Skipped { .. }))
    }
}

impl From<FilterRule> for CompiledRule {
    fn from(rule: FilterRule) -> Self {
        Self::new(rule, 0)
    }
}

/// Evaluates one feed record against one rule.
///
/// Non-listed records never match. Otherwise every populated constraint must
/// pass or be not-applicable.
pub fn evaluate_single(record: &FeedRecord, rule: &CompiledRule) -> bool {
    if !record.is_listed() {
        return false;
    }

    for c in &rule.constraints {
        let outcome = c.check(&record.sale);
        if outcome.rejects() {
            trace!(
                sale_id = record.sale.sale_id,
                rule = %rule.label,
                constraint = ?c,
                "rule rejected sale"
            );
            return false;
        }
        if outcome == Check::NotApplicable {
            trace!(sale_id = record.sale.sale_id, constraint = ?c, "constraint skipped");
        }
    }

    true
}

/// Returns the first rule of `set` that accepts `record`.
pub fn evaluate_set<'a>(record: &FeedRecord, set: &'a FilterSet) -> Option<&'a CompiledRule> {
    set.rules.iter().find(|r| evaluate_single(record, r))
}

/// Ordered rule collection with OR semantics.
///
/// An empty set matches nothing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSet {
    rules: Vec<CompiledRule>,
}

impl FilterSet {
    pub fn new(rules: Vec<FilterRule>) -> Self {
        let rules = rules
            .into_iter()
            .enumerate()
            .map(|(i, r)| CompiledRule::new(r, i))
            .collect();
        Self { rules }
    }

    /// A set that never matches.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn evaluate(&self, record: &FeedRecord) -> Option<&CompiledRule> {
        evaluate_set(record, self)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CompiledRule> {
        self.rules.iter()
    }
}

impl FromIterator<FilterRule> for FilterSet {
    fn from_iter<I: IntoIterator<Item = FilterRule>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
