use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;

use crate::error::ClientError;
use crate::models::Record;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    pub field: String,
    pub direction: SortDirection,
}

impl SortKey {
    pub fn asc(field: impl Into<String>) -> Self {
        Self { field: field.into(), direction: SortDirection::Asc }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self { field: field.into(), direction: SortDirection::Desc }
    }

    /// Missing values go last in ascending order; descending is the exact reverse
    pub fn compare<T: Record>(&self, a: &T, b: &T) -> Ordering {
        let ordering = match (a.field(&self.field), b.field(&self.field)) {
            (Some(x), Some(y)) => x.compare(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        match self.direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    }
}

/// Parse `"name"`, `"created_at desc"`, `"plan asc, amount desc"`,
/// `["a desc", "b"]` or `{"a": "desc"}`
pub fn parse_order(order: &Value) -> Result<Vec<SortKey>, ClientError> {
    match order {
        Value::Null => Ok(vec![]),
        Value::String(s) => parse_order_str(s),
        Value::Array(arr) => {
            let mut out = Vec::new();
            for v in arr {
                match v {
                    Value::String(s) => out.extend(parse_order_str(s)?),
                    other => {
                        return Err(ClientError::validation(format!("Invalid sort entry: {}", other)))
                    }
                }
            }
            Ok(out)
        }
        Value::Object(obj) => {
            let mut out = Vec::new();
            for (field, dir) in obj {
                let direction = parse_direction(dir.as_str().unwrap_or("asc"))?;
                out.push(SortKey { field: field.clone(), direction });
            }
            Ok(out)
        }
        other => Err(ClientError::validation(format!("Invalid sort order: {}", other))),
    }
}

pub fn parse_order_str(s: &str) -> Result<Vec<SortKey>, ClientError> {
    let mut out = Vec::new();
    for part in s.split(',') {
        let trimmed = part.trim();
        if trimmed.is_empty() {
            continue;
        }
        let mut it = trimmed.split_whitespace();
        if let Some(field) = it.next() {
            let direction = parse_direction(it.next().unwrap_or("asc"))?;
            if let Some(extra) = it.next() {
                return Err(ClientError::validation(format!("Unexpected '{}' in sort order", extra)));
            }
            out.push(SortKey { field: field.to_string(), direction });
        }
    }
    Ok(out)
}

fn parse_direction(s: &str) -> Result<SortDirection, ClientError> {
    if s.eq_ignore_ascii_case("asc") {
        Ok(SortDirection::Asc)
    } else if s.eq_ignore_ascii_case("desc") {
        Ok(SortDirection::Desc)
    } else {
        Err(ClientError::validation(format!("Sort direction must be asc or desc, got '{}'", s)))
    }
}

/// Stable sort by one field; ties keep fetch order
pub fn sort<T: Record>(items: &[T], field: &str, direction: SortDirection) -> Vec<T> {
    sort_by_keys(items, &[SortKey { field: field.to_string(), direction }])
}

/// Keys apply left to right; remaining ties keep fetch order
pub fn sort_by_keys<T: Record>(items: &[T], keys: &[SortKey]) -> Vec<T> {
    let mut out = items.to_vec();
    out.sort_by(|a, b| {
        keys.iter()
            .map(|k| k.compare(a, b))
            .find(|o| *o != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    });
    out
}
