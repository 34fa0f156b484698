use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single backend entity (candidate, user, job role) kept as a loose field map.
///
/// The backend schema is trusted optimistically: every accessor tolerates absent
/// or oddly-typed fields instead of failing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    /// View-stable identifier: `id`, falling back to `_id`.
    pub fn key(&self) -> Option<String> {
        ["id", "_id"]
            .iter()
            .find_map(|f| self.0.get(*f).and_then(render_text))
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field).filter(|v| !v.is_null())
    }

    pub fn set(&mut self, field: &str, value: Value) {
        self.0.insert(field.to_string(), value);
    }

    /// Field rendered as display text. Strings are returned as-is, numbers and
    /// booleans are formatted, null and absent fields yield `None`.
    pub fn text(&self, field: &str) -> Option<String> {
        self.get(field).and_then(render_text)
    }

    /// Field coerced to a number. Absent fields count as 0, unparsable strings as NaN.
    pub fn number(&self, field: &str) -> f64 {
        match self.get(field) {
            None => 0.0,
            Some(Value::Number(n)) => n.as_f64().unwrap_or(f64::NAN),
            Some(Value::String(s)) => coerce_number(s),
            Some(Value::Bool(b)) => f64::from(u8::from(*b)),
            Some(_) => f64::NAN,
        }
    }

    /// Field coerced to a truth value the way a loosely typed client would.
    pub fn flag(&self, field: &str) -> bool {
        match self.get(field) {
            None => false,
            Some(Value::Bool(b)) => *b,
            Some(Value::Number(n)) => n.as_f64().map(|x| x != 0.0 && !x.is_nan()).unwrap_or(false),
            Some(Value::String(s)) => !s.is_empty(),
            Some(_) => true,
        }
    }

    pub fn is_present(&self, field: &str) -> bool {
        self.get(field).is_some()
    }
}

pub(crate) fn render_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

/// Numeric coercion of free text: blank is 0, anything unparsable is NaN.
pub fn coerce_number(raw: &str) -> f64 {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return 0.0;
    }
    trimmed.parse::<f64>().unwrap_or(f64::NAN)
}

#[cfg(test)]
pub(crate) fn record(value: Value) -> Record {
    serde_json::from_value(value).expect("test record must be a JSON object")
}
