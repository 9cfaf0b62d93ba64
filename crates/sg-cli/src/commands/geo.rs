//! Geo command implementation
//!
//! Matches every subject to its nearest reference location, gates the match
//! dataset like any other stage output, and publishes it together with a
//! JSON run summary.

use anyhow::{Context, Result};
use sg_core::{Contract, DatasetId};
use sg_geo::{
    references_from_dataset, subjects_from_dataset, GeoMatcher, GeoSummary, MatchOptions,
};
use sg_validate::ValidationGate;
use std::path::{Path, PathBuf};

use crate::cli::{GeoArgs, GlobalArgs, OutputFormat};
use crate::commands::common::{check_upstream, print_report_text, resolve_run_id, ExitCode};
use crate::context::ProjectContext;

/// Execute the geo command
pub(crate) async fn execute(args: &GeoArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = ProjectContext::load(global)?;
    let stage = ctx.stage_name(&args.stage)?;
    let run_id = resolve_run_id(args.run_id.as_deref())?;
    let ledger = ctx.ledger(run_id.clone());
    let output_id = DatasetId::new(stage.clone(), run_id.clone());

    check_upstream(&ctx, &stage, &ledger)?;

    // References first: an unusable reference set stops the run before any
    // subject is read
    let reference_data = ctx
        .db
        .load_dataset(output_id.clone(), &args.references)
        .await
        .with_context(|| format!("Failed to load {}", args.references.display()))?;
    let references = references_from_dataset(
        &reference_data,
        &args.reference_id,
        &args.reference_lat,
        &args.reference_lon,
    )?;
    let matcher = GeoMatcher::with_options(references, MatchOptions::from(&ctx.config.geo))?;

    let subject_data = ctx
        .db
        .load_dataset(output_id.clone(), &args.subjects)
        .await
        .with_context(|| format!("Failed to load {}", args.subjects.display()))?;
    let subjects = subjects_from_dataset(&subject_data, &args.subject_id, &args.lat, &args.lon)?;

    let outcome = matcher.nearest(&subjects);
    let summary = GeoSummary::new(&matcher, subjects.len(), &outcome);
    let matches = outcome.to_dataset(output_id);

    // Stages without a contract are still gated, against an empty one
    let fallback;
    let contract = match ctx.contracts.get(&stage) {
        Some(contract) => contract,
        None => {
            log::warn!("No contract for stage '{}'; gating with an empty contract", stage);
            fallback = Contract::new(stage.clone());
            &fallback
        }
    };
    let report = ValidationGate::new(contract)
        .with_input_row_count(subjects.len())
        .run(&matches);
    // A passed report must not outlive a failed publish
    let published = if report.passed() && args.publish {
        let path = ctx
            .store()
            .write(ctx.db.as_ref(), &matches)
            .await
            .context("Failed to publish matches; no report recorded")?;
        let summary_path = write_summary(&path, &summary)?;
        Some((path, summary_path))
    } else {
        None
    };

    let report_path = ledger
        .save_report(&stage, &report)
        .context("Failed to record validation report")?;

    match args.output {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "summary": summary,
                    "report": report,
                }))?
            );
        }
        OutputFormat::Text => {
            println!("references: {}", summary.references);
            println!("subjects:   {}", summary.subjects);
            println!("matched:    {}", summary.matched);
            println!("skipped:    {}", summary.skipped);
            for (reason, count) in &summary.skipped_by_reason {
                println!("  {}: {}", reason, count);
            }
            print_report_text(&report);
            println!("  report:   {}", report_path.display());
            if let Some((path, summary_path)) = &published {
                println!("  published: {}", path.display());
                println!("  summary:   {}", summary_path.display());
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

/// Write the summary next to the dataset as `<run_id>.summary.json`
fn write_summary(dataset_path: &Path, summary: &GeoSummary) -> Result<PathBuf> {
    let path = dataset_path.with_extension("summary.json");
    std::fs::write(&path, serde_json::to_string_pretty(summary)?)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}
