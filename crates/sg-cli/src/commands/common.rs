//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use sg_core::{CoreError, RunId, RunLedger, StageName};
use sg_validate::ValidationReport;
use std::fmt;

use crate::context::ProjectContext;

/// Error type representing a non-zero process exit code.
///
/// Use `return Err(ExitCode(N).into())` instead of `std::process::exit(N)`
/// so that RAII destructors run and cleanup happens properly.
#[derive(Debug)]
pub(crate) struct ExitCode(pub(crate) i32);

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Control flow only; nothing user-facing to print
        write!(f, "")
    }
}

impl std::error::Error for ExitCode {}

/// Use the given run id or generate a fresh one
pub(crate) fn resolve_run_id(run_id: Option<&str>) -> Result<RunId> {
    match run_id {
        Some(id) => RunId::try_new(id.trim()).ok_or_else(|| {
            CoreError::InvalidName {
                context: "--run-id".to_string(),
            }
            .into()
        }),
        None => Ok(RunId::generate()),
    }
}

/// Require passed reports from every upstream stage in this run.
///
/// Raw upstream stages need no report, but one that exists must have
/// passed. Returns the upstream output row count when there is exactly one
/// upstream with a report.
pub(crate) fn check_upstream(
    ctx: &ProjectContext,
    stage: &StageName,
    ledger: &RunLedger,
) -> Result<Option<usize>> {
    let upstream = ctx.config.upstream_of(stage);
    let mut rows = Vec::with_capacity(upstream.len());

    for up in upstream {
        let report: Option<ValidationReport> = ledger
            .load_report(up)
            .with_context(|| format!("Failed to read report of upstream stage '{}'", up))?;
        match report {
            Some(report) if report.passed() => rows.push(report.row_count_out()),
            Some(report) => {
                return Err(CoreError::UpstreamFailed {
                    stage: stage.to_string(),
                    upstream: up.to_string(),
                    run_id: ledger.run_id().to_string(),
                    violations: report.violations().len(),
                }
                .into())
            }
            None if ctx.config.is_raw_stage(up) => {
                log::debug!("Raw upstream '{}' has no report in this run", up);
            }
            None => {
                return Err(CoreError::UpstreamNotValidated {
                    stage: stage.to_string(),
                    upstream: up.to_string(),
                    run_id: ledger.run_id().to_string(),
                }
                .into())
            }
        }
    }

    Ok(match (upstream.len(), rows.as_slice()) {
        (1, [rows]) => Some(*rows),
        _ => None,
    })
}

/// Print a report: summary, every violation and every warning
pub(crate) fn print_report_text(report: &ValidationReport) {
    println!("{}", report.summary());
    println!(
        "  rows in:  {}",
        report
            .row_count_in()
            .map(|n| n.to_string())
            .unwrap_or_else(|| "(not supplied)".to_string())
    );
    println!("  rows out: {}", report.row_count_out());
    println!("  rules:    {}", report.rules_evaluated());

    for violation in report.violations() {
        println!(
            "  ERROR [{}] {}: {} (count {})",
            violation.rule,
            violation.column.as_deref().unwrap_or("-"),
            violation.detail,
            violation.count
        );
    }
    for warning in report.warnings() {
        println!(
            "  WARN  {}: {}",
            warning.column.as_deref().unwrap_or("-"),
            warning.detail
        );
    }
}

/// Print a report as pretty JSON
pub(crate) fn print_report_json(report: &ValidationReport) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(report).context("Failed to serialize report")?
    );
    Ok(())
}
