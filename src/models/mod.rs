pub mod feedback;
pub mod flag;
pub mod subscription;
pub mod user;

use chrono::{DateTime, Utc};
use serde_json::Value;
use std::cmp::Ordering;
use std::fmt;

pub use feedback::Feedback;
pub use flag::{FeatureFlag, FlagConfigInput};
pub use subscription::Subscription;
pub use user::User;

/// A sortable, filterable value pulled out of a record by field name
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Bool(bool),
    Number(f64),
    Date(DateTime<Utc>),
    Text(String),
}

impl FieldValue {
    fn rank(&self) -> u8 {
        match self {
            FieldValue::Bool(_) => 0,
            FieldValue::Number(_) => 1,
            FieldValue::Date(_) => 2,
            FieldValue::Text(_) => 3,
        }
    }

    /// Total order: numbers and dates numerically, text lexicographically.
    /// Mixed kinds fall back to a fixed kind order.
    pub fn compare(&self, other: &FieldValue) -> Ordering {
        match (self, other) {
            (FieldValue::Bool(a), FieldValue::Bool(b)) => a.cmp(b),
            (FieldValue::Number(a), FieldValue::Number(b)) => a.total_cmp(b),
            (FieldValue::Date(a), FieldValue::Date(b)) => a.cmp(b),
            (FieldValue::Text(a), FieldValue::Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Interpret a JSON literal as the same kind of value as `self`
    pub fn coerce(&self, value: &Value) -> Option<FieldValue> {
        match (self, value) {
            (FieldValue::Bool(_), Value::Bool(b)) => Some(FieldValue::Bool(*b)),
            (FieldValue::Number(_), Value::Number(n)) => n.as_f64().map(FieldValue::Number),
            (FieldValue::Number(_), Value::String(s)) => s.parse().ok().map(FieldValue::Number),
            (FieldValue::Date(_), Value::String(s)) => DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|d| FieldValue::Date(d.with_timezone(&Utc))),
            (FieldValue::Text(_), Value::String(s)) => Some(FieldValue::Text(s.clone())),
            (FieldValue::Text(_), other) if !other.is_null() => Some(FieldValue::Text(other.to_string())),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Bool(b) => write!(f, "{}", if *b { "yes" } else { "no" }),
            FieldValue::Number(n) => write!(f, "{}", n),
            FieldValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d %H:%M")),
            FieldValue::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        FieldValue::Number(n)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(d: DateTime<Utc>) -> Self {
        FieldValue::Date(d)
    }
}

/// One row of a backend resource
pub trait Record: Clone + Send + Sync + 'static {
    /// Collection path under the API prefix, e.g. `users`
    const RESOURCE: &'static str;

    /// Singular label used in user-facing messages
    const LABEL: &'static str;

    fn id(&self) -> String;

    fn field(&self, name: &str) -> Option<FieldValue>;
}
