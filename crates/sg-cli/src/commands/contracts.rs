//! Contracts command implementation

use anyhow::Result;
use serde::Serialize;
use sg_core::Rule;

use crate::cli::{ContractsArgs, GlobalArgs, OutputFormat};
use crate::context::ProjectContext;

#[derive(Debug, Serialize)]
struct ContractListing<'a> {
    stage: &'a str,
    declared_stage: bool,
    rules: Vec<Rule>,
}

/// Load every contract (failing on the first malformed one) and list rules
pub(crate) async fn execute(args: &ContractsArgs, global: &GlobalArgs) -> Result<()> {
    let ctx = ProjectContext::load(global)?;

    let listings: Vec<ContractListing<'_>> = ctx
        .contracts
        .iter()
        .map(|(stage, contract)| ContractListing {
            stage: stage.as_str(),
            declared_stage: ctx.config.stage(stage).is_some() || ctx.config.is_raw_stage(stage),
            rules: contract.rules(),
        })
        .collect();

    for listing in listings.iter().filter(|l| !l.declared_stage) {
        log::warn!(
            "Contract for '{}' does not match any stage in the project configuration",
            listing.stage
        );
    }

    match args.output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&listings)?),
        OutputFormat::Text => {
            if listings.is_empty() {
                println!("No contracts found");
            }
            for listing in &listings {
                let note = if listing.declared_stage { "" } else { " (undeclared stage)" };
                println!("{}{}: {} rule(s)", listing.stage, note, listing.rules.len());
                for rule in &listing.rules {
                    println!("  - {}", rule.label());
                }
            }
        }
    }
    Ok(())
}
