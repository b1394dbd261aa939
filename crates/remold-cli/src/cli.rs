//! Command-line interface argument parsing and definitions
//!
//! This module defines the CLI structure using clap's derive API,
//! providing a type-safe and well-documented command interface.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Remold CLI - Schema-driven JSON transformation
///
/// A command-line tool for deriving output JSON from an input context,
/// driven by a declarative schema with an Excel-formula-like expression
/// language.
#[derive(Parser, Debug)]
#[command(
    name = "remold",
    version,
    author,
    about,
    long_about = None,
    propagate_version = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Enable verbose output (can be used multiple times for increased verbosity)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// The subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Transform a context document with a schema
    Transform(TransformArgs),

    /// Check that a schema document compiles
    Check(CheckArgs),
}

/// Arguments for the transform command
#[derive(Parser, Debug)]
pub struct TransformArgs {
    /// Path to the schema document (`-` reads from stdin)
    #[arg(value_name = "SCHEMA")]
    pub schema: PathBuf,

    /// Path to a JSON context document seeding register 0 (`-` reads from
    /// stdin); defaults to an empty context
    #[arg(short, long, value_name = "CONTEXT")]
    pub context: Option<PathBuf>,

    /// Pretty-print the output JSON
    #[arg(short, long)]
    pub pretty: bool,

    /// Output file path (stdout if not specified)
    #[arg(long = "save-to")]
    pub output_file: Option<PathBuf>,
}

/// Arguments for the check command
#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Path to the schema document (`-` reads from stdin)
    #[arg(value_name = "SCHEMA")]
    pub schema: PathBuf,
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Effective verbosity level (0 when quiet)
    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }

    /// Whether colored output should be used
    pub fn use_color(&self) -> bool {
        !self.no_color
    }
}
