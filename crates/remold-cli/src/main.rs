//! Remold CLI - Transform JSON documents with declarative schemas
//!
//! This is the main entry point for the Remold CLI application, providing
//! commands for transforming context documents and checking that schemas
//! compile.

mod cli;
mod error;
mod handlers;
mod logging;

use cli::{Cli, Commands};
use colored::control;
use error::Result;
use std::process;
use tracing::instrument;

fn main() {
    // Parse command-line arguments
    let cli = Cli::parse_args();

    // Set up colored output
    control::set_override(cli.use_color());

    // Initialize logging
    if let Err(e) = logging::init_logging(cli.verbosity_level(), cli.quiet) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    // Run the application
    match run(cli) {
        Ok(()) => {
            process::exit(0);
        }
        Err(e) => {
            eprintln!(
                "{}",
                error::format_error(&e, control::SHOULD_COLORIZE.should_colorize())
            );
            process::exit(e.exit_code());
        }
    }
}

/// Main application logic
#[instrument(skip(cli), fields(command = ?cli.command))]
fn run(cli: Cli) -> Result<()> {
    tracing::info!(verbosity = cli.verbosity_level(), "Executing command");

    match cli.command {
        Commands::Transform(args) => handlers::handle_transform(args),
        Commands::Check(args) => handlers::handle_check(args),
    }
}
