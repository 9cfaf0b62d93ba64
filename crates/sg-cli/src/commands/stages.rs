//! Stages command implementation

use anyhow::{Context, Result};
use serde::Serialize;
use sg_core::StageDag;

use crate::cli::{GlobalArgs, OutputFormat, StagesArgs};
use crate::context::ProjectContext;

#[derive(Debug, Serialize)]
struct StageRow {
    name: String,
    raw: bool,
    upstream: Vec<String>,
    has_contract: bool,
}

/// List stages in dependency order
pub(crate) async fn execute(args: &StagesArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = ProjectContext::load(global)?;
    let dag = StageDag::from_config(&ctx.config).context("Failed to build stage graph")?;

    let rows: Vec<StageRow> = dag
        .topological_order()?
        .into_iter()
        .map(|name| StageRow {
            raw: ctx.config.is_raw_stage(&name),
            upstream: dag.upstream(&name).iter().map(|s| s.to_string()).collect(),
            has_contract: ctx.contracts.contains_key(&name),
            name: name.to_string(),
        })
        .collect();

    match args.output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
        OutputFormat::Text => {
            for row in &rows {
                let kind = if row.raw { "raw" } else { "stage" };
                let contract = if row.has_contract { "" } else { " (no contract)" };
                if row.upstream.is_empty() {
                    println!("{:<5} {}{}", kind, row.name, contract);
                } else {
                    println!(
                        "{:<5} {} <- {}{}",
                        kind,
                        row.name,
                        row.upstream.join(", "),
                        contract
                    );
                }
            }
        }
    }
    Ok(())
}
