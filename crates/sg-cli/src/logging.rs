//! Logging setup for the CLI
//!
//! Library crates log through the `log` facade; the subscriber installed here
//! also captures those records. `RUST_LOG` wins over the `--verbose` default.

use anyhow::{anyhow, Result};
use tracing_subscriber::EnvFilter;

/// Install the stderr subscriber
pub(crate) fn init_logging(verbose: bool) -> Result<()> {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(verbose)
        .try_init()
        .map_err(|e| anyhow!("Failed to initialize logging: {}", e))
}
