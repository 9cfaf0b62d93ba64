//! Tagged rule set compiled from a stage contract
//!
//! The validation gate never inspects a [`Contract`](crate::contract::Contract)
//! directly; it interprets this flat list. New rule kinds are added here and
//! given an evaluator, without touching the gate loop.

use crate::column_type::ColumnType;
use crate::contract::{RowCountRelation, ValueRange};
use serde::Serialize;
use std::collections::BTreeSet;

/// A single contract rule
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum Rule {
    /// Column must be present in the schema
    RequiredColumn { column: String },
    /// Column, when present, must have a compatible type
    ColumnType {
        column: String,
        expected: ColumnType,
    },
    /// Fraction of null values must not exceed `max_rate`
    NullRate { column: String, max_rate: f64 },
    /// No two records may share the same key tuple
    Unique { columns: Vec<String> },
    /// Output row count relative to the input row count
    RowCount { relation: RowCountRelation },
    /// Dataset must hold at least `min` rows
    MinRows { min: usize },
    /// Numeric values must fall inside an inclusive range
    ValueRange { column: String, range: ValueRange },
    /// Values must be neither null nor whitespace-only
    NotBlank { column: String },
    /// Columns outside `declared` are reported as warnings
    UnexpectedColumns { declared: BTreeSet<String> },
}

impl Rule {
    /// Short label for logs and listings
    pub fn label(&self) -> String {
        match self {
            Rule::RequiredColumn { column } => format!("required({})", column),
            Rule::ColumnType { column, expected } => format!("type({}: {})", column, expected),
            Rule::NullRate { column, max_rate } => format!("null_rate({} <= {})", column, max_rate),
            Rule::Unique { columns } => format!("unique({})", columns.join(", ")),
            Rule::RowCount { relation } => format!("row_count({})", relation),
            Rule::MinRows { min } => format!("min_rows({})", min),
            Rule::ValueRange { column, range } => format!("range({} in {})", column, range),
            Rule::NotBlank { column } => format!("not_blank({})", column),
            Rule::UnexpectedColumns { .. } => "unexpected_columns".to_string(),
        }
    }
}
