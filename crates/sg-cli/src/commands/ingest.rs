//! Ingest command implementation

use anyhow::{bail, Context, Result};
use sg_core::RawCheck;

use crate::cli::{GlobalArgs, IngestArgs};
use crate::commands::common::resolve_run_id;
use crate::context::ProjectContext;

/// Snapshot a raw file into the raw zone and fingerprint it for the run
pub(crate) async fn execute(args: &IngestArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = ProjectContext::load(global)?;
    let stage = ctx.stage_name(&args.stage)?;
    if !ctx.config.is_raw_stage(&stage) {
        bail!(
            "Stage '{}' is not listed in raw_stages; only raw stages accept snapshots",
            stage
        );
    }
    let run_id = resolve_run_id(args.run_id.as_deref())?;
    let ledger = ctx.ledger(run_id.clone());

    // Fingerprint before copying so a file changing mid-ingest is caught
    // by the next check in this run
    let check = ledger
        .check_raw_input(&args.file)
        .with_context(|| format!("Failed to fingerprint {}", args.file.display()))?;
    if let RawCheck::Mutated { path, .. } = &check {
        bail!("Raw input {} changed since it was first read in run {}", path, run_id);
    }

    let path = ctx
        .store()
        .ingest_raw(ctx.db.as_ref(), &stage, &run_id, &args.file)
        .await
        .context("Failed to ingest raw snapshot")?;

    let checksum = match &check {
        RawCheck::Recorded { checksum, .. } | RawCheck::Unchanged { checksum, .. } => {
            checksum.as_str()
        }
        RawCheck::Mutated { actual, .. } => actual.as_str(),
    };
    println!("run:      {}", run_id);
    println!("snapshot: {}", path.display());
    println!("sha256:   {}", checksum);
    Ok(())
}
