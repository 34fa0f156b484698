use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::table::record::{render_text, Record};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// Applies the direction to a comparator result. Ties stay ties.
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }

    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

/// Active sort key and direction. `key: None` means the page's default ordering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortDirective {
    pub key: Option<String>,
    pub direction: SortDirection,
}

impl SortDirective {
    pub fn by(key: &str, direction: SortDirection) -> Self {
        Self {
            key: Some(key.to_string()),
            direction,
        }
    }

    /// Directive after the user selects column `key`: the same key flips
    /// direction, a different key starts ascending.
    pub fn toggle(&self, key: &str) -> Self {
        let direction = match self.key.as_deref() {
            Some(current) if current == key => self.direction.flipped(),
            _ => SortDirection::Asc,
        };
        Self::by(key, direction)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    /// Case-insensitive text, native ordering for non-string values.
    Text,
    /// Numbers and numeric strings, coerced before comparison.
    Numeric,
    /// Truthy values ordered as 0/1.
    Boolean,
}

/// A sortable column of a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Column {
    pub key: &'static str,
    pub kind: ColumnKind,
}

impl Column {
    pub const fn text(key: &'static str) -> Self {
        Self { key, kind: ColumnKind::Text }
    }

    pub const fn numeric(key: &'static str) -> Self {
        Self { key, kind: ColumnKind::Numeric }
    }

    pub const fn boolean(key: &'static str) -> Self {
        Self { key, kind: ColumnKind::Boolean }
    }

    /// Ascending comparison of two records on this column.
    pub fn compare(&self, a: &Record, b: &Record) -> Ordering {
        match self.kind {
            ColumnKind::Boolean => a.flag(self.key).cmp(&b.flag(self.key)),
            ColumnKind::Numeric => compare_numbers(a.number(self.key), b.number(self.key)),
            ColumnKind::Text => compare_values(a.get(self.key), b.get(self.key)),
        }
    }
}

/// Total order over coerced numbers: NaN ranks after every number.
fn compare_numbers(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
    }
}

/// Rank of a JSON type in a mixed column: numbers, then strings, then
/// booleans, then anything else.
fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Number(_) => 0,
        Value::String(_) => 1,
        Value::Bool(_) => 2,
        _ => 3,
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let (a, b) = match (a, b) {
        (Some(a), Some(b)) => (a, b),
        (Some(_), None) => return Ordering::Less,
        (None, Some(_)) => return Ordering::Greater,
        (None, None) => return Ordering::Equal,
    };
    type_rank(a).cmp(&type_rank(b)).then_with(|| match (a, b) {
        (Value::Number(a), Value::Number(b)) => {
            compare_numbers(a.as_f64().unwrap_or(f64::NAN), b.as_f64().unwrap_or(f64::NAN))
        }
        (Value::String(a), Value::String(b)) => a.to_lowercase().cmp(&b.to_lowercase()),
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        (a, b) => {
            let a = render_text(a).unwrap_or_default().to_lowercase();
            let b = render_text(b).unwrap_or_default().to_lowercase();
            a.cmp(&b)
        }
    })
}

/// Stable sort of a view by `column` in `direction`.
pub fn sort_view(view: &mut [&Record], column: &Column, direction: SortDirection) {
    view.sort_by(|a, b| direction.apply(column.compare(a, b)));
}
