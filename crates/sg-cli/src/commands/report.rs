//! Report command implementation

use anyhow::{Context, Result};
use sg_core::{RunId, StageName};
use sg_validate::ValidationReport;

use crate::cli::{GlobalArgs, OutputFormat, ReportArgs};
use crate::commands::common::{print_report_json, print_report_text, resolve_run_id, ExitCode};
use crate::context::ProjectContext;

/// Print a stored report. Exits non-zero when the report failed.
pub(crate) async fn execute(args: &ReportArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = ProjectContext::load(global)?;
    let run_id: RunId = resolve_run_id(Some(&args.run_id))?;
    let ledger = ctx.ledger(run_id.clone());

    let report: ValidationReport = ledger
        .load_report(&args.stage)
        .context("Failed to read report")?
        .with_context(|| {
            let recorded = ledger
                .reported_stages()
                .unwrap_or_default()
                .iter()
                .map(StageName::to_string)
                .collect::<Vec<_>>()
                .join(", ");
            format!(
                "No report for stage '{}' in run '{}' (reported: {})",
                args.stage,
                run_id,
                if recorded.is_empty() { "none" } else { recorded.as_str() }
            )
        })?;

    match args.output {
        OutputFormat::Json => print_report_json(&report)?,
        OutputFormat::Text => {
            print_report_text(&report);
            println!(
                "  validated at {}",
                report.validated_at().format("%Y-%m-%d %H:%M:%S UTC")
            );
        }
    }

    if !report.passed() {
        return Err(ExitCode(1).into());
    }
    Ok(())
}
