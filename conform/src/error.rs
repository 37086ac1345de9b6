//! Fatal configuration errors.
//!
//! Anything in this enum aborts the run before a single case executes.
//! Per-case trouble (launch failures, nonzero exits, hangs) is never an error;
//! it is classified and recorded in the report instead.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("case directory {} doesn't exist", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("interpreter binary {} not found", .0.display())]
    BinaryNotFound(PathBuf),

    #[error("invalid skip regex {pattern:?}")]
    InvalidSkipPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("invalid variant {name:?}: {reason}")]
    InvalidVariant { name: String, reason: String },

    #[error("{0}")]
    Invalid(String),
}
