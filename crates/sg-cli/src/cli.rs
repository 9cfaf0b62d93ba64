//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Stagegate - contract-gated batch stages
#[derive(Parser, Debug)]
#[command(name = "sg")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to project directory
    #[arg(short = 'p', long, global = true, default_value = ".")]
    pub project_dir: String,

    /// Override config file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate a stage output against its contract
    Validate(ValidateArgs),

    /// Match subjects to their nearest reference location
    Geo(GeoArgs),

    /// Snapshot a raw input file into the raw zone
    Ingest(IngestArgs),

    /// Show a stored validation report
    Report(ReportArgs),

    /// List stages in dependency order
    Stages(StagesArgs),

    /// Load and lint every contract
    Contracts(ContractsArgs),
}

/// Output formats
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text
    #[default]
    Text,
    /// JSON output
    Json,
}

/// Arguments for the validate command
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Stage whose contract applies
    pub stage: String,

    /// Stage output file (csv, tsv, parquet or json)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Run id (generated when omitted)
    #[arg(short, long, env = "SG_RUN_ID")]
    pub run_id: Option<String>,

    /// Row count of the stage input
    #[arg(long, conflicts_with = "input_of")]
    pub input_rows: Option<usize>,

    /// Stage input file to count rows from
    #[arg(long)]
    pub input_of: Option<PathBuf>,

    /// Raw input files read by this stage (fingerprinted for the run)
    #[arg(long = "raw")]
    pub raw_inputs: Vec<PathBuf>,

    /// Write the dataset to the store when the report passes
    #[arg(long)]
    pub publish: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

/// Arguments for the geo command
#[derive(Args, Debug)]
pub struct GeoArgs {
    /// Subject file
    #[arg(long)]
    pub subjects: PathBuf,

    /// Reference location file
    #[arg(long)]
    pub references: PathBuf,

    /// Subject id column
    #[arg(long, default_value = "id")]
    pub subject_id: String,

    /// Subject latitude column
    #[arg(long, default_value = "latitude")]
    pub lat: String,

    /// Subject longitude column
    #[arg(long, default_value = "longitude")]
    pub lon: String,

    /// Reference id column
    #[arg(long, default_value = "id")]
    pub reference_id: String,

    /// Reference latitude column
    #[arg(long, default_value = "latitude")]
    pub reference_lat: String,

    /// Reference longitude column
    #[arg(long, default_value = "longitude")]
    pub reference_lon: String,

    /// Run id (generated when omitted)
    #[arg(short, long, env = "SG_RUN_ID")]
    pub run_id: Option<String>,

    /// Stage the match output belongs to
    #[arg(long, default_value = "geo_near_me")]
    pub stage: String,

    /// Write matches and summary to the store when the report passes
    #[arg(long)]
    pub publish: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

/// Arguments for the ingest command
#[derive(Args, Debug)]
pub struct IngestArgs {
    /// Raw stage receiving the snapshot
    pub stage: String,

    /// File to snapshot
    #[arg(short, long)]
    pub file: PathBuf,

    /// Run id (generated when omitted)
    #[arg(short, long, env = "SG_RUN_ID")]
    pub run_id: Option<String>,
}

/// Arguments for the report command
#[derive(Args, Debug)]
pub struct ReportArgs {
    /// Stage to show
    pub stage: String,

    /// Run the report belongs to
    #[arg(short, long)]
    pub run_id: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

/// Arguments for the stages command
#[derive(Args, Debug)]
pub struct StagesArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

/// Arguments for the contracts command
#[derive(Args, Debug)]
pub struct ContractsArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
