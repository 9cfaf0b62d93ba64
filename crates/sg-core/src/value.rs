//! Typed cell values and records

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A single typed cell value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Missing value
    Null,
    /// Boolean
    Bool(bool),
    /// Integer of any source width
    Integer(i64),
    /// Floating point (decimals are read as floats)
    Float(f64),
    /// Point in time, normalized to UTC
    Timestamp(DateTime<Utc>),
    /// Text
    String(String),
}

impl Value {
    /// Whether this value is null
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Numeric view of the value.
    ///
    /// Integers and floats convert directly; strings are parsed so that
    /// coordinates stored as text still resolve. Non-finite results are
    /// returned as-is and left to the caller to reject.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }
    }

    /// String view of text values
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Canonical hashable form used for key tuples.
    pub fn key_part(&self) -> KeyPart {
        match self {
            Value::Null => KeyPart::Null,
            Value::Bool(b) => KeyPart::Bool(*b),
            Value::Integer(i) => KeyPart::Integer(*i),
            // -0.0 and 0.0 compare equal, so they must hash equal too
            Value::Float(f) if *f == 0.0 => KeyPart::Float(0.0f64.to_bits()),
            Value::Float(f) => KeyPart::Float(f.to_bits()),
            Value::Timestamp(t) => KeyPart::Timestamp(t.timestamp_micros()),
            Value::String(s) => KeyPart::String(s.clone()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Timestamp(t) => write!(f, "{}", t.to_rfc3339()),
            Value::String(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(t: DateTime<Utc>) -> Self {
        Value::Timestamp(t)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

/// Hashable projection of a [`Value`], one element of a key tuple
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum KeyPart {
    Null,
    Bool(bool),
    Integer(i64),
    Float(u64),
    Timestamp(i64),
    String(String),
}

/// One row: column name to value.
///
/// A column absent from the map reads as [`Value::Null`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record(BTreeMap<String, Value>);

static NULL: Value = Value::Null;

impl Record {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a column value, returning the record for chaining
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(column, value);
        self
    }

    /// Set a column value
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(column.into(), value.into());
    }

    /// Value of a column; null when absent
    pub fn get(&self, column: &str) -> &Value {
        self.0.get(column).unwrap_or(&NULL)
    }

    /// Whether the record carries the column at all
    pub fn contains(&self, column: &str) -> bool {
        self.0.contains_key(column)
    }

    /// Iterate columns in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of columns carried
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the record carries no columns
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_column_reads_null() {
        let record = Record::new().with("id", "a");
        assert!(record.get("lat").is_null());
        assert!(!record.contains("lat"));
        assert_eq!(record.get("id"), &Value::from("a"));
    }

    #[test]
    fn test_as_f64_parses_text() {
        assert_eq!(Value::from(" 34.1 ").as_f64(), Some(34.1));
        assert_eq!(Value::Integer(3).as_f64(), Some(3.0));
        assert_eq!(Value::from("north").as_f64(), None);
        assert_eq!(Value::Null.as_f64(), None);
    }

    #[test]
    fn test_key_part_signed_zero() {
        assert_eq!(Value::Float(0.0).key_part(), Value::Float(-0.0).key_part());
        assert_ne!(Value::Float(1.0).key_part(), Value::Integer(1).key_part());
    }

    #[test]
    fn test_option_into_value() {
        let none: Option<f64> = None;
        assert!(Value::from(none).is_null());
        assert_eq!(Value::from(Some(2.5)), Value::Float(2.5));
    }

    #[test]
    fn test_untagged_json() {
        let record: Record =
            serde_json::from_str(r#"{"id": "x", "n": 3, "score": 1.5, "gone": null}"#).unwrap();
        assert_eq!(record.get("n"), &Value::Integer(3));
        assert_eq!(record.get("score"), &Value::Float(1.5));
        assert!(record.get("gone").is_null());
        assert!(record.contains("gone"));
    }
}
