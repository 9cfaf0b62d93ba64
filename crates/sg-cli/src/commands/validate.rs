//! Validate command implementation
//!
//! Reads a stage output, checks the run's upstream reports and raw input
//! fingerprints, runs the validation gate and records the report. With
//! `--publish`, the validated file itself is copied into the store after a
//! passed gate, and the report is recorded only once that write succeeded.

use anyhow::{bail, Context, Result};
use sg_core::DatasetId;
use sg_validate::ValidationGate;

use crate::cli::{GlobalArgs, OutputFormat, ValidateArgs};
use crate::commands::common::{
    check_upstream, print_report_json, print_report_text, resolve_run_id, ExitCode,
};
use crate::context::ProjectContext;

/// Execute the validate command
pub(crate) async fn execute(args: &ValidateArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = ProjectContext::load(global)?;
    let stage = ctx.stage_name(&args.stage)?;
    let contract = ctx.contract(&stage)?;
    if args.publish && ctx.config.is_raw_stage(&stage) {
        bail!(
            "Stage '{}' is a raw stage; use `sg ingest` to snapshot raw inputs",
            stage
        );
    }
    let run_id = resolve_run_id(args.run_id.as_deref())?;
    let ledger = ctx.ledger(run_id.clone());

    let upstream_rows = check_upstream(&ctx, &stage, &ledger)?;

    let dataset = ctx
        .db
        .load_dataset(DatasetId::new(stage.clone(), run_id.clone()), &args.input)
        .await
        .with_context(|| format!("Failed to load {}", args.input.display()))?;

    let input_rows = match (args.input_rows, &args.input_of) {
        (Some(rows), _) => Some(rows),
        (None, Some(path)) => Some(
            ctx.db
                .count_rows(path)
                .await
                .with_context(|| format!("Failed to count rows of {}", path.display()))?,
        ),
        (None, None) => upstream_rows,
    };

    let mut raw_checks = Vec::with_capacity(args.raw_inputs.len());
    for raw in &args.raw_inputs {
        let check = ledger
            .check_raw_input(raw)
            .with_context(|| format!("Failed to fingerprint raw input {}", raw.display()))?;
        log::debug!("Raw input check: {:?}", check);
        raw_checks.push(check);
    }

    let report = ValidationGate::new(contract)
        .with_optional_input_row_count(input_rows)
        .with_raw_checks(raw_checks)
        .run(&dataset);

    // A passed report must not outlive a failed publish
    let published = if report.passed() && args.publish {
        let path = ctx
            .store()
            .publish_file(ctx.db.as_ref(), dataset.id(), &args.input)
            .await
            .context("Failed to publish dataset; no report recorded")?;
        Some(path)
    } else {
        None
    };

    let report_path = ledger
        .save_report(&stage, &report)
        .context("Failed to record validation report")?;

    match args.output {
        OutputFormat::Json => print_report_json(&report)?,
        OutputFormat::Text => {
            print_report_text(&report);
            println!("  report:   {}", report_path.display());
            if let Some(path) = &published {
                println!("  published: {}", path.display());
            }
        }
    }

    if !report.passed() {
        eprintln!(
            "Validation failed for {} ({} violation(s)); nothing was written",
            report.dataset(),
            report.violations().len()
        );
        return Err(ExitCode(1).into());
    }

    Ok(())
}
