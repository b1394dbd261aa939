//! Error types for the Remold core library
//!
//! This module defines the error handling system for Remold, using thiserror
//! for ergonomic error definitions. Construction-time errors (raised while a
//! schema is compiled into a transformer tree) and invocation-time errors
//! (raised while the tree is evaluated) are separate variants, so callers can
//! tell a bad schema apart from bad input data.

use thiserror::Error;

/// Main error type for Remold operations
#[derive(Error, Debug)]
pub enum Error {
    /// Schema node `type` is missing or not one of the recognized kinds
    #[error("unrecognized schema node type: {detail}")]
    UnknownType { detail: String },

    /// Schema shape violation detected while compiling a node
    #[error("invalid schema: {message}")]
    Schema { message: String },

    /// A register reference did not name register 0 or 1
    #[error("invalid register reference `{reference}`: only $0 (context) and $1 (plugins) exist")]
    InvalidRegister { reference: String },

    /// A dotted/indexed path did not resolve against its register
    #[error("path `{path}` not found: no entry for `{segment}`")]
    PathNotFound { path: String, segment: String },

    /// An expression's operation selector matched no built-in and no plugin
    #[error("unknown operation `{name}`: not a built-in and no matching plugin")]
    UnknownOperation { name: String },

    /// An operation rejected its arguments, or a plugin invocation failed
    #[error("evaluation failed: {message}")]
    Evaluation {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// JSON parsing errors while reading a schema or context document
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a schema shape error
    pub fn schema(message: impl Into<String>) -> Self {
        Error::Schema {
            message: message.into(),
        }
    }

    /// Create an evaluation error without an underlying cause
    pub fn evaluation(message: impl Into<String>) -> Self {
        Error::Evaluation {
            message: message.into(),
            source: None,
        }
    }

    /// True for errors raised while compiling a schema, as opposed to errors
    /// raised while evaluating a compiled transformer tree.
    pub fn is_build_error(&self) -> bool {
        matches!(
            self,
            Error::UnknownType { .. } | Error::Schema { .. } | Error::Json { .. }
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json {
            message: err.to_string(),
            source: err,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::UnknownOperation {
            name: "frobnicate".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "unknown operation `frobnicate`: not a built-in and no matching plugin"
        );
    }

    #[test]
    fn test_path_not_found_display() {
        let err = Error::PathNotFound {
            path: "$0.rec.foo".to_string(),
            segment: "foo".to_string(),
        };
        assert!(err.to_string().contains("$0.rec.foo"));
        assert!(err.to_string().contains("`foo`"));
    }

    #[test]
    fn test_build_error_classification() {
        assert!(Error::schema("bad mapping").is_build_error());
        assert!(Error::UnknownType {
            detail: "`frob`".to_string()
        }
        .is_build_error());
        assert!(!Error::evaluation("bad arity").is_build_error());
        assert!(!Error::PathNotFound {
            path: "$0.x".to_string(),
            segment: "x".to_string()
        }
        .is_build_error());
    }
}
