use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::table::lookup::Lookups;
use crate::table::record::{coerce_number, Record};

/// Current user-entered filter values. An empty value means "no constraint".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterSet(BTreeMap<String, String>);

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: &str, value: &str) {
        self.0.insert(key.to_string(), value.to_string());
    }

    /// Value for `key`, empty when unset.
    pub fn get(&self, key: &str) -> &str {
        self.0.get(key).map(String::as_str).unwrap_or("")
    }

    pub fn is_unconstrained(&self) -> bool {
        self.0.values().all(String::is_empty)
    }
}

impl FromIterator<(String, String)> for FilterSet {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Closed score interval parsed from `"min-max"`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreRange {
    pub min: f64,
    pub max: f64,
}

impl ScoreRange {
    /// `None` for an empty filter. Malformed bounds become NaN, which makes
    /// [`ScoreRange::contains`] false for every score.
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.is_empty() {
            return None;
        }
        let mut parts = raw.split('-');
        let mut bound = || parts.next().map(coerce_number).unwrap_or(f64::NAN);
        let min = bound();
        let max = bound();
        Some(Self { min, max })
    }

    pub fn contains(&self, score: f64) -> bool {
        score >= self.min && score <= self.max
    }
}

/// Where a filtered field's text comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldSource {
    Raw(&'static str),
    /// Field holds an identifier that is resolved through a named lookup table.
    Lookup {
        field: &'static str,
        table: &'static str,
    },
}

impl FieldSource {
    fn text(&self, record: &Record, lookups: &Lookups) -> Option<String> {
        match self {
            FieldSource::Raw(field) => record.text(field),
            FieldSource::Lookup { field, table } => record
                .text(field)
                .and_then(|id| lookups.resolve(table, &id).map(str::to_string)),
        }
    }
}

/// Per-field predicate semantics.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Case-insensitive substring match. An absent field fails a non-empty filter.
    Contains(FieldSource),
    /// Case-insensitive equality.
    Exact(&'static str),
    /// `"min-max"` range over a numeric field, absent scores count as 0.
    ScoreRange(&'static str),
    /// `"enabled"` / `"disabled"` against a boolean field.
    ActiveFlag(&'static str),
}

impl Predicate {
    pub fn test(&self, record: &Record, value: &str, lookups: &Lookups) -> bool {
        if value.is_empty() {
            return true;
        }
        match self {
            Predicate::Contains(source) => source
                .text(record, lookups)
                .map(|text| text.to_lowercase().contains(&value.to_lowercase()))
                .unwrap_or(false),
            Predicate::Exact(field) => record
                .text(field)
                .map(|text| text.to_lowercase() == value.to_lowercase())
                .unwrap_or(false),
            Predicate::ScoreRange(field) => ScoreRange::parse(value)
                .map(|range| range.contains(record.number(field)))
                .unwrap_or(true),
            Predicate::ActiveFlag(field) => match value {
                "enabled" => record.flag(field),
                "disabled" => !record.flag(field),
                _ => false,
            },
        }
    }
}

/// A filter key bound to its predicate.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterRule {
    pub key: &'static str,
    pub predicate: Predicate,
}

impl FilterRule {
    pub fn new(key: &'static str, predicate: Predicate) -> Self {
        Self { key, predicate }
    }
}

/// True iff the record passes every registered rule. Filter values with no
/// registered rule are ignored.
pub fn matches(record: &Record, rules: &[FilterRule], filters: &FilterSet, lookups: &Lookups) -> bool {
    rules
        .iter()
        .all(|rule| rule.predicate.test(record, filters.get(rule.key), lookups))
}

/// Filtered view preserving input order.
pub fn apply<'a>(
    records: &'a [Record],
    rules: &[FilterRule],
    filters: &FilterSet,
    lookups: &Lookups,
) -> Vec<&'a Record> {
    records
        .iter()
        .filter(|r| matches(r, rules, filters, lookups))
        .collect()
}
