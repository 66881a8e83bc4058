//! Logging setup using `tracing` + `tracing-subscriber`.
//!
//! Priority for determining the log filter:
//! 1. `--verbose` / `--quiet` CLI flags
//! 2. `FSSTATE_LOG` environment variable (any `EnvFilter` directive, e.g. "fsstate=debug")
//! 3. `logging.level` from the configuration file

use anyhow::{Result, anyhow};
use tracing_subscriber::EnvFilter;

use crate::output::Verbosity;

/// Environment variable holding a log filter directive
pub const LOG_ENV: &str = "FSSTATE_LOG";

/// Initialise the global logging subscriber.
///
/// Only the binary calls this; the library just emits events.
///
/// # Errors
///
/// Returns an error if the filter directive is invalid or a subscriber is
/// already installed
pub fn init_logging(verbosity: Verbosity, config_level: &str) -> Result<()> {
    let filter = match verbosity {
        Verbosity::Verbose => EnvFilter::new("debug"),
        Verbosity::Quiet => EnvFilter::new("error"),
        Verbosity::Normal => match std::env::var(LOG_ENV) {
            Ok(directive) => EnvFilter::try_new(directive)?,
            Err(_) => EnvFilter::try_new(config_level.trim().to_lowercase())?,
        },
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("Failed to install log subscriber: {e}"))
}
