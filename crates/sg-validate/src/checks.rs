//! One evaluator per rule kind

use crate::report::{RuleKind, Violation, Warning};
use sg_core::{ColumnType, Dataset, KeyPart, RowCountRelation, Rule, ValueRange};
use std::collections::{BTreeSet, HashMap};

/// Inputs shared by every evaluator
pub(crate) struct EvalContext<'a> {
    pub dataset: &'a Dataset,
    pub input_rows: Option<usize>,
}

/// Accumulated findings; evaluators only ever append
#[derive(Debug, Default)]
pub(crate) struct Findings {
    pub violations: Vec<Violation>,
    pub warnings: Vec<Warning>,
}

impl Findings {
    fn violation(&mut self, rule: RuleKind, column: Option<&str>, detail: String, count: usize) {
        self.violations.push(Violation {
            rule,
            column: column.map(str::to_string),
            detail,
            count,
        });
    }

    fn warning(&mut self, column: Option<&str>, detail: String) {
        self.warnings.push(Warning {
            column: column.map(str::to_string),
            detail,
        });
    }

    fn missing_column(&mut self, column: &str, needed_by: &str) {
        self.violation(
            RuleKind::SchemaViolation,
            Some(column),
            format!("column '{}' needed by {} is missing", column, needed_by),
            1,
        );
    }
}

/// Evaluate one rule, appending whatever it finds
pub(crate) fn evaluate(rule: &Rule, ctx: &EvalContext<'_>, out: &mut Findings) {
    match rule {
        Rule::RequiredColumn { column } => check_required(ctx, column, out),
        Rule::ColumnType { column, expected } => check_type(ctx, column, expected, out),
        Rule::NullRate { column, max_rate } => check_null_rate(ctx, column, *max_rate, out),
        Rule::Unique { columns } => check_unique(ctx, columns, out),
        Rule::RowCount { relation } => check_row_count(ctx, *relation, out),
        Rule::MinRows { min } => check_min_rows(ctx, *min, out),
        Rule::ValueRange { column, range } => check_range(ctx, column, range, out),
        Rule::NotBlank { column } => check_not_blank(ctx, column, out),
        Rule::UnexpectedColumns { declared } => check_unexpected(ctx, declared, out),
    }
}

fn check_required(ctx: &EvalContext<'_>, column: &str, out: &mut Findings) {
    if !ctx.dataset.has_column(column) {
        out.violation(
            RuleKind::SchemaViolation,
            Some(column),
            format!("required column '{}' is missing", column),
            1,
        );
    }
}

fn check_type(ctx: &EvalContext<'_>, column: &str, expected: &ColumnType, out: &mut Findings) {
    // Absence is reported by the required-column rule
    let Some(schema) = ctx.dataset.column(column) else {
        return;
    };
    match &schema.data_type {
        None => out.warning(
            Some(column),
            format!(
                "column '{}' holds no non-null values; type {} not verified",
                column, expected
            ),
        ),
        Some(actual) if expected.accepts(actual) => {}
        Some(actual) => {
            let non_null = ctx.dataset.values(column).filter(|v| !v.is_null()).count();
            out.violation(
                RuleKind::SchemaViolation,
                Some(column),
                format!(
                    "column '{}' has type {}, expected {}",
                    column, actual, expected
                ),
                non_null,
            );
        }
    }
}

fn check_null_rate(ctx: &EvalContext<'_>, column: &str, max_rate: f64, out: &mut Findings) {
    if !ctx.dataset.has_column(column) {
        out.missing_column(column, "allowed_null_rate");
        return;
    }

    let total = ctx.dataset.len();
    let nulls = ctx.dataset.values(column).filter(|v| v.is_null()).count();
    let observed = rate(nulls, total);

    // Strictly greater: a rate equal to the threshold passes
    if observed > max_rate {
        out.violation(
            RuleKind::NullRateViolation,
            Some(column),
            format!(
                "column '{}' null rate {:.4} exceeds allowed {:.4} ({} of {} rows null)",
                column, observed, max_rate, nulls, total
            ),
            nulls,
        );
    }
}

fn check_not_blank(ctx: &EvalContext<'_>, column: &str, out: &mut Findings) {
    if !ctx.dataset.has_column(column) {
        out.missing_column(column, "not_blank");
        return;
    }

    let blanks = ctx
        .dataset
        .values(column)
        .filter(|v| v.is_null() || v.as_str().is_some_and(|s| s.trim().is_empty()))
        .count();
    if blanks > 0 {
        out.violation(
            RuleKind::NullRateViolation,
            Some(column),
            format!(
                "column '{}' has {} null or blank value(s) in {} rows",
                column,
                blanks,
                ctx.dataset.len()
            ),
            blanks,
        );
    }
}

fn check_unique(ctx: &EvalContext<'_>, columns: &[String], out: &mut Findings) {
    let missing: Vec<&str> = columns
        .iter()
        .filter(|c| !ctx.dataset.has_column(c))
        .map(String::as_str)
        .collect();
    if !missing.is_empty() {
        let needed_by = format!("uniqueness key ({})", columns.join(", "));
        for column in missing {
            out.missing_column(column, &needed_by);
        }
        return;
    }

    // Null participates in the key as an ordinary value
    let mut groups: HashMap<Vec<KeyPart>, usize> = HashMap::new();
    for record in ctx.dataset.records() {
        let key: Vec<KeyPart> = columns.iter().map(|c| record.get(c).key_part()).collect();
        *groups.entry(key).or_insert(0) += 1;
    }

    let duplicate_groups = groups.values().filter(|&&n| n > 1).count();
    if duplicate_groups > 0 {
        let rows_covered: usize = groups.values().filter(|&&n| n > 1).sum();
        out.violation(
            RuleKind::UniquenessViolation,
            None,
            format!(
                "key ({}) has {} duplicate group(s) covering {} rows",
                columns.join(", "),
                duplicate_groups,
                rows_covered
            ),
            duplicate_groups,
        );
    }
}

fn check_row_count(ctx: &EvalContext<'_>, relation: RowCountRelation, out: &mut Findings) {
    if relation == RowCountRelation::Any {
        return;
    }

    let rows_out = ctx.dataset.len();
    let Some(rows_in) = ctx.input_rows else {
        out.violation(
            RuleKind::RowCountViolation,
            None,
            format!(
                "relation {} needs an input row count but none was supplied",
                relation
            ),
            0,
        );
        return;
    };

    match relation {
        RowCountRelation::EqualToInput if rows_out != rows_in => out.violation(
            RuleKind::RowCountViolation,
            None,
            format!(
                "expected {} rows (equal_to_input), found {}",
                rows_in, rows_out
            ),
            rows_out.abs_diff(rows_in),
        ),
        RowCountRelation::LteInput if rows_out > rows_in => out.violation(
            RuleKind::RowCountViolation,
            None,
            format!(
                "expected at most {} rows (lte_input), found {}",
                rows_in, rows_out
            ),
            rows_out - rows_in,
        ),
        _ => {}
    }
}

fn check_min_rows(ctx: &EvalContext<'_>, min: usize, out: &mut Findings) {
    let rows = ctx.dataset.len();
    if rows < min {
        out.violation(
            RuleKind::RowCountViolation,
            None,
            format!("expected at least {} rows, found {}", min, rows),
            min - rows,
        );
    }
}

fn check_range(ctx: &EvalContext<'_>, column: &str, range: &ValueRange, out: &mut Findings) {
    if !ctx.dataset.has_column(column) {
        out.missing_column(column, "value_ranges");
        return;
    }

    // Non-numeric values cannot be shown to be in range
    let outside = ctx
        .dataset
        .values(column)
        .filter(|v| !v.is_null())
        .filter(|v| !v.as_f64().is_some_and(|x| range.contains(x)))
        .count();
    if outside > 0 {
        out.violation(
            RuleKind::RangeViolation,
            Some(column),
            format!(
                "column '{}' has {} value(s) outside {}",
                column, outside, range
            ),
            outside,
        );
    }
}

fn check_unexpected(ctx: &EvalContext<'_>, declared: &BTreeSet<String>, out: &mut Findings) {
    for schema in ctx.dataset.columns() {
        if !declared.contains(&schema.name) {
            out.warning(
                Some(&schema.name),
                format!("column '{}' is not declared by the contract", schema.name),
            );
        }
    }
}

fn rate(part: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64
    }
}
