//! Error types and handling for the CLI
//!
//! This module provides error types and utilities for handling
//! various failure modes in the CLI application.

use std::io;
use std::path::PathBuf;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for CLI operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error (file operations, etc.)
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Error from remold-core library
    #[error("Core error: {0}")]
    Core(#[from] remold_core::Error),

    /// File not found
    #[error("File not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// JSON serialization/deserialization error
    #[error("JSON error in {}: {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Generic error with context
    #[error("{message}")]
    Other { message: String },
}

impl Error {
    /// Create a generic error with message
    #[allow(dead_code)]
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Io(_) => 1,
            // "bad schema" and "bad input data" exit differently, so callers
            // in scripts can tell them apart
            Self::Core(core) if core.is_build_error() => 2,
            Self::Core(_) => 3,
            Self::FileNotFound { .. } => 4,
            Self::Json { .. } => 5,
            Self::Other { .. } => 99,
        }
    }
}

/// Format an error for display to the user
pub fn format_error(error: &Error, use_color: bool) -> String {
    if use_color {
        use colored::Colorize;
        format!("{} {}", "Error:".red().bold(), error)
    } else {
        format!("Error: {}", error)
    }
}
