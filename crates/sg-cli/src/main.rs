//! Stagegate CLI - contract-gated batch stages

use clap::Parser;

mod cli;
mod commands;
mod context;
mod logging;

use cli::Cli;
use commands::common::ExitCode;
use commands::{contracts, geo, ingest, report, stages, validate};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(err) = logging::init_logging(cli.global.verbose) {
        eprintln!("Warning: {:#}", err);
    }

    let result = match &cli.command {
        cli::Commands::Validate(args) => validate::execute(args, &cli.global).await,
        cli::Commands::Geo(args) => geo::execute(args, &cli.global).await,
        cli::Commands::Ingest(args) => ingest::execute(args, &cli.global).await,
        cli::Commands::Report(args) => report::execute(args, &cli.global).await,
        cli::Commands::Stages(args) => stages::execute(args, &cli.global).await,
        cli::Commands::Contracts(args) => contracts::execute(args, &cli.global).await,
    };

    if let Err(err) = result {
        let code = match err.downcast_ref::<ExitCode>() {
            Some(exit) => exit.0,
            None => {
                eprintln!("Error: {:#}", err);
                1
            }
        };
        std::process::exit(code);
    }
}
