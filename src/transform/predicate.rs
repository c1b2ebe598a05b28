use serde_json::Value;
use std::cmp::Ordering;

use crate::error::ClientError;
use crate::models::{FieldValue, Record};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    Like,
    ILike,
    In,
}

/// In-memory predicate compiled from a JSON where-clause such as
/// `{"plan": "pro", "amount": {"$gte": 20}, "$or": [{...}, {...}]}`
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Compare { field: String, op: CompareOp, value: Value },
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
    Not(Box<Predicate>),
}

impl Predicate {
    pub fn parse(where_data: &Value) -> Result<Self, ClientError> {
        match where_data {
            Value::Null => Ok(Predicate::And(vec![])),
            Value::Object(obj) => {
                let mut parts = Vec::new();
                for (key, value) in obj {
                    if key.starts_with('$') {
                        parts.push(Self::parse_logical(key, value)?);
                    } else {
                        parts.extend(Self::parse_field(key, value)?);
                    }
                }
                Ok(if parts.len() == 1 { parts.remove(0) } else { Predicate::And(parts) })
            }
            _ => Err(ClientError::validation("Filter must be a JSON object")),
        }
    }

    pub fn parse_str(text: &str) -> Result<Self, ClientError> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| ClientError::field_error("filter", format!("Filter is not valid JSON: {}", e)))?;
        Self::parse(&value)
    }

    fn parse_logical(op: &str, value: &Value) -> Result<Self, ClientError> {
        match op {
            "$and" | "$or" => {
                let arr = value
                    .as_array()
                    .ok_or_else(|| ClientError::validation(format!("{} requires an array", op)))?;
                let parts = arr.iter().map(Self::parse).collect::<Result<Vec<_>, _>>()?;
                Ok(if op == "$and" { Predicate::And(parts) } else { Predicate::Or(parts) })
            }
            "$not" => Ok(Predicate::Not(Box::new(Self::parse(value)?))),
            other => Err(ClientError::validation(format!("Unsupported operator: {}", other))),
        }
    }

    fn parse_field(field: &str, value: &Value) -> Result<Vec<Self>, ClientError> {
        match value {
            Value::Object(obj) if obj.keys().all(|k| k.starts_with('$')) && !obj.is_empty() => obj
                .iter()
                .map(|(op_key, op_val)| {
                    let op = Self::map_operator(op_key)?;
                    if op == CompareOp::In && !op_val.is_array() {
                        return Err(ClientError::validation("$in requires an array"));
                    }
                    Ok(Predicate::Compare { field: field.to_string(), op, value: op_val.clone() })
                })
                .collect(),
            // Implicit equality: { field: value }
            _ => Ok(vec![Predicate::Compare {
                field: field.to_string(),
                op: CompareOp::Eq,
                value: value.clone(),
            }]),
        }
    }

    fn map_operator(op_key: &str) -> Result<CompareOp, ClientError> {
        Ok(match op_key {
            "$eq" => CompareOp::Eq,
            "$ne" | "$neq" => CompareOp::Ne,
            "$gt" => CompareOp::Gt,
            "$gte" => CompareOp::Gte,
            "$lt" => CompareOp::Lt,
            "$lte" => CompareOp::Lte,
            "$like" => CompareOp::Like,
            "$ilike" => CompareOp::ILike,
            "$in" => CompareOp::In,
            other => return Err(ClientError::validation(format!("Unsupported operator: {}", other))),
        })
    }

    pub fn matches<T: Record>(&self, record: &T) -> bool {
        match self {
            Predicate::And(parts) => parts.iter().all(|p| p.matches(record)),
            Predicate::Or(parts) => parts.iter().any(|p| p.matches(record)),
            Predicate::Not(inner) => !inner.matches(record),
            Predicate::Compare { field, op, value } => compare(record.field(field), *op, value),
        }
    }
}

fn compare(actual: Option<FieldValue>, op: CompareOp, expected: &Value) -> bool {
    let Some(actual) = actual else {
        // A missing field only equals null
        return match op {
            CompareOp::Eq => expected.is_null(),
            CompareOp::Ne => !expected.is_null(),
            _ => false,
        };
    };

    match op {
        CompareOp::In => expected
            .as_array()
            .map(|values| values.iter().any(|v| ordering(&actual, v) == Some(Ordering::Equal)))
            .unwrap_or(false),
        CompareOp::Like | CompareOp::ILike => match expected.as_str() {
            Some(pattern) => like(pattern, &actual.to_string(), op == CompareOp::ILike),
            None => false,
        },
        CompareOp::Eq => ordering(&actual, expected) == Some(Ordering::Equal),
        CompareOp::Ne => ordering(&actual, expected) != Some(Ordering::Equal),
        CompareOp::Gt => ordering(&actual, expected) == Some(Ordering::Greater),
        CompareOp::Gte => matches!(ordering(&actual, expected), Some(Ordering::Greater | Ordering::Equal)),
        CompareOp::Lt => ordering(&actual, expected) == Some(Ordering::Less),
        CompareOp::Lte => matches!(ordering(&actual, expected), Some(Ordering::Less | Ordering::Equal)),
    }
}

fn ordering(actual: &FieldValue, expected: &Value) -> Option<Ordering> {
    actual.coerce(expected).map(|e| actual.compare(&e))
}

/// SQL-style LIKE: `%` matches any run, `_` matches one character
fn like(pattern: &str, text: &str, case_insensitive: bool) -> bool {
    let (pattern, text) = if case_insensitive {
        (pattern.to_lowercase(), text.to_lowercase())
    } else {
        (pattern.to_string(), text.to_string())
    };
    let p: Vec<char> = pattern.chars().collect();
    let t: Vec<char> = text.chars().collect();

    // matched[j]: pattern prefix so far matches t[..j]
    let mut matched = vec![false; t.len() + 1];
    matched[0] = true;
    for pc in &p {
        let mut next = vec![false; t.len() + 1];
        match pc {
            '%' => {
                let mut any = false;
                for j in 0..=t.len() {
                    any = any || matched[j];
                    next[j] = any;
                }
            }
            _ => {
                for j in 1..=t.len() {
                    next[j] = matched[j - 1] && (*pc == '_' || *pc == t[j - 1]);
                }
            }
        }
        matched = next;
    }
    matched[t.len()]
}
