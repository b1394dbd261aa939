//! Logging setup for the CLI
//!
//! Maps the `-v`/`-q` flags onto a tracing-subscriber filter, with
//! `RUST_LOG` taking precedence when set. Engine-side `log` records are
//! captured through the same subscriber. All diagnostics go to stderr so
//! stdout stays clean for the transformation output.

use crate::error::Result;
use std::io;
use tracing_subscriber::EnvFilter;

/// Level filter derived from the CLI verbosity flags
fn level_for(verbosity: u8, quiet: bool) -> &'static str {
    if quiet {
        return "error";
    }
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Initialize the logging system
pub fn init_logging(verbosity: u8, quiet: bool) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level_for(verbosity, quiet)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(verbosity >= 2)
        .init();

    Ok(())
}
