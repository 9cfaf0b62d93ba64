//! Column types and type compatibility
//!
//! Types arrive from two places: DuckDB `DESCRIBE` output for file-backed
//! datasets, and contract YAML written by people. Both go through the same
//! normalization so that `INT`, `INTEGER` and `BIGINT` compare as one family.

use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A normalized column type
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ColumnType {
    /// Text
    String,
    /// Any integer width
    Integer,
    /// Binary floating point
    Float,
    /// Fixed-point decimal
    Decimal,
    /// Any numeric type; only meaningful as a contract expectation
    Number,
    /// Boolean
    Boolean,
    /// Calendar date
    Date,
    /// Time of day
    Time,
    /// Point in time
    Timestamp,
    /// Raw bytes
    Binary,
    /// Anything else, kept verbatim (upper-cased)
    Other(String),
}

/// Marker used for in-memory columns holding more than one kind of value.
pub const MIXED_TYPE: &str = "MIXED";

impl ColumnType {
    /// Parse a SQL/DuckDB type name or a contract family name
    pub fn parse(raw: &str) -> Self {
        let upper = raw.trim().to_uppercase();

        // Drop precision/scale and length suffixes: DECIMAL(38,1), VARCHAR(50)
        let base = match upper.find('(') {
            Some(paren) => upper[..paren].trim(),
            None => upper.as_str(),
        };

        match base {
            "VARCHAR" | "CHAR" | "BPCHAR" | "TEXT" | "STRING" | "UUID" => ColumnType::String,
            "INTEGER" | "INT" | "INT4" | "INT8" | "BIGINT" | "SMALLINT" | "TINYINT" | "HUGEINT"
            | "UBIGINT" | "UINTEGER" | "USMALLINT" | "UTINYINT" | "LONG" => ColumnType::Integer,
            "DOUBLE" | "FLOAT" | "FLOAT4" | "FLOAT8" | "REAL" => ColumnType::Float,
            "DECIMAL" | "NUMERIC" => ColumnType::Decimal,
            "NUMBER" => ColumnType::Number,
            "BOOLEAN" | "BOOL" => ColumnType::Boolean,
            "DATE" => ColumnType::Date,
            "TIME" => ColumnType::Time,
            "TIMESTAMP" | "DATETIME" | "TIMESTAMPTZ" | "TIMESTAMP WITH TIME ZONE"
            | "TIMESTAMP_S" | "TIMESTAMP_MS" | "TIMESTAMP_NS" => ColumnType::Timestamp,
            "BLOB" | "BYTEA" | "BINARY" | "VARBINARY" => ColumnType::Binary,
            other => ColumnType::Other(other.to_string()),
        }
    }

    /// Type of a single in-memory value; `None` for null
    pub fn of_value(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Bool(_) => Some(ColumnType::Boolean),
            Value::Integer(_) => Some(ColumnType::Integer),
            Value::Float(_) => Some(ColumnType::Float),
            Value::String(_) => Some(ColumnType::String),
            Value::Timestamp(_) => Some(ColumnType::Timestamp),
        }
    }

    /// The mixed-kind marker type
    pub fn mixed() -> Self {
        ColumnType::Other(MIXED_TYPE.to_string())
    }

    /// Whether this is one of the numeric families
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            ColumnType::Integer | ColumnType::Float | ColumnType::Decimal | ColumnType::Number
        )
    }

    /// Whether a column observed as `actual` satisfies this expected type
    pub fn accepts(&self, actual: &ColumnType) -> bool {
        match self {
            ColumnType::Number => actual.is_numeric(),
            expected => expected == actual,
        }
    }

    /// Canonical upper-case name
    pub fn name(&self) -> &str {
        match self {
            ColumnType::String => "VARCHAR",
            ColumnType::Integer => "BIGINT",
            ColumnType::Float => "DOUBLE",
            ColumnType::Decimal => "DECIMAL",
            ColumnType::Number => "NUMBER",
            ColumnType::Boolean => "BOOLEAN",
            ColumnType::Date => "DATE",
            ColumnType::Time => "TIME",
            ColumnType::Timestamp => "TIMESTAMP",
            ColumnType::Binary => "BLOB",
            ColumnType::Other(name) => name,
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<String> for ColumnType {
    fn from(s: String) -> Self {
        ColumnType::parse(&s)
    }
}

impl From<&str> for ColumnType {
    fn from(s: &str) -> Self {
        ColumnType::parse(s)
    }
}

impl From<ColumnType> for String {
    fn from(t: ColumnType) -> Self {
        t.name().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_aliases() {
        assert_eq!(ColumnType::parse("INT"), ColumnType::Integer);
        assert_eq!(ColumnType::parse("bigint"), ColumnType::Integer);
        assert_eq!(ColumnType::parse("SMALLINT"), ColumnType::Integer);
    }

    #[test]
    fn test_string_aliases() {
        assert_eq!(ColumnType::parse("text"), ColumnType::String);
        assert_eq!(ColumnType::parse("VARCHAR(50)"), ColumnType::String);
        assert_eq!(ColumnType::parse("string"), ColumnType::String);
    }

    #[test]
    fn test_decimal_precision_ignored() {
        assert_eq!(ColumnType::parse("DECIMAL(38,1)"), ColumnType::Decimal);
        assert_eq!(ColumnType::parse("numeric"), ColumnType::Decimal);
    }

    #[test]
    fn test_timestamp_variants() {
        assert_eq!(ColumnType::parse("timestamp"), ColumnType::Timestamp);
        assert_eq!(
            ColumnType::parse("TIMESTAMP WITH TIME ZONE"),
            ColumnType::Timestamp
        );
        assert_eq!(ColumnType::parse("datetime"), ColumnType::Timestamp);
    }

    #[test]
    fn test_number_accepts_numeric_families() {
        let number = ColumnType::parse("number");
        assert!(number.accepts(&ColumnType::Integer));
        assert!(number.accepts(&ColumnType::Float));
        assert!(number.accepts(&ColumnType::Decimal));
        assert!(!number.accepts(&ColumnType::String));
    }

    #[test]
    fn test_incompatible_types() {
        assert!(!ColumnType::Integer.accepts(&ColumnType::String));
        assert!(!ColumnType::Boolean.accepts(&ColumnType::Integer));
        assert!(!ColumnType::Date.accepts(&ColumnType::Timestamp));
        assert!(!ColumnType::Integer.accepts(&ColumnType::mixed()));
    }

    #[test]
    fn test_unknown_type_kept_verbatim() {
        assert_eq!(
            ColumnType::parse("struct"),
            ColumnType::Other("STRUCT".to_string())
        );
    }

    #[test]
    fn test_serde_as_string() {
        let t: ColumnType = serde_yaml::from_str("timestamp").unwrap();
        assert_eq!(t, ColumnType::Timestamp);
        assert_eq!(serde_json::to_string(&ColumnType::Float).unwrap(), r#""DOUBLE""#);
    }
}
