//! Validation reports

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sg_core::DatasetId;
use std::fmt;

/// Category of a hard violation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleKind {
    /// Missing or mistyped column
    SchemaViolation,
    /// Too many nulls (or blanks)
    NullRateViolation,
    /// Duplicate key tuples
    UniquenessViolation,
    /// Row count outside the declared relation or minimum
    RowCountViolation,
    /// Numeric values outside a declared range
    RangeViolation,
    /// Raw input changed after it was first read in this run
    ImmutabilityViolation,
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RuleKind::SchemaViolation => "schema_violation",
            RuleKind::NullRateViolation => "null_rate_violation",
            RuleKind::UniquenessViolation => "uniqueness_violation",
            RuleKind::RowCountViolation => "row_count_violation",
            RuleKind::RangeViolation => "range_violation",
            RuleKind::ImmutabilityViolation => "immutability_violation",
        };
        f.write_str(name)
    }
}

/// One hard rule failure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    /// Violation category
    pub rule: RuleKind,
    /// Column involved, if the rule is column-scoped
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    /// Human-readable description
    pub detail: String,
    /// Rule-specific count (rows, duplicate groups, missing rows, ...)
    pub count: usize,
}

/// A non-fatal anomaly, reported for visibility only
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Warning {
    /// Column involved, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<String>,
    /// Human-readable description
    pub detail: String,
}

/// Outcome of checking one dataset against one contract.
///
/// Built once by the gate and handed to the caller; there are no mutators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    dataset: DatasetId,
    passed: bool,
    violations: Vec<Violation>,
    warnings: Vec<Warning>,
    row_count_in: Option<usize>,
    row_count_out: usize,
    rules_evaluated: usize,
    validated_at: DateTime<Utc>,
}

impl ValidationReport {
    pub(crate) fn new(
        dataset: DatasetId,
        violations: Vec<Violation>,
        warnings: Vec<Warning>,
        row_count_in: Option<usize>,
        row_count_out: usize,
        rules_evaluated: usize,
    ) -> Self {
        Self {
            dataset,
            passed: violations.is_empty(),
            violations,
            warnings,
            row_count_in,
            row_count_out,
            rules_evaluated,
            validated_at: Utc::now(),
        }
    }

    /// Dataset that was validated
    pub fn dataset(&self) -> &DatasetId {
        &self.dataset
    }

    /// Whether the dataset is cleared for downstream use
    pub fn passed(&self) -> bool {
        self.passed
    }

    /// Every hard violation found, in rule order
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Non-fatal warnings
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Input row count the dataset was compared against
    pub fn row_count_in(&self) -> Option<usize> {
        self.row_count_in
    }

    /// Row count of the validated dataset
    pub fn row_count_out(&self) -> usize {
        self.row_count_out
    }

    /// Number of rules interpreted
    pub fn rules_evaluated(&self) -> usize {
        self.rules_evaluated
    }

    /// When the report was produced
    pub fn validated_at(&self) -> DateTime<Utc> {
        self.validated_at
    }

    /// Violations of one kind
    pub fn violations_of(&self, kind: RuleKind) -> impl Iterator<Item = &Violation> {
        self.violations.iter().filter(move |v| v.rule == kind)
    }

    /// One-line summary with row counts
    pub fn summary(&self) -> String {
        let rows_in = self
            .row_count_in
            .map(|n| n.to_string())
            .unwrap_or_else(|| "-".to_string());
        format!(
            "{} {}: rows in={}, rows out={}, {} violation(s), {} warning(s)",
            self.dataset,
            if self.passed { "PASSED" } else { "FAILED" },
            rows_in,
            self.row_count_out,
            self.violations.len(),
            self.warnings.len()
        )
    }
}
