//! Error types for ectop.
//!
//! Only loaders, parsers and I/O paths return errors. Lookups in the grid
//! engine resolve to `Option` and never fail.

use std::io;
use thiserror::Error;

/// Error type for configuration, filter parsing and output operations.
///
/// Configuration errors carry the line number reported by the YAML parser.
#[derive(Debug, Error)]
pub enum EctopError {
    /// Configuration parsing error with line number.
    #[error("configuration error at line {line}: {message}")]
    ConfigParse {
        /// Line number where the error occurred (1-indexed, 0 when unknown).
        line: usize,
        /// Error message describing the issue.
        message: String,
    },

    /// Configuration file not found.
    #[error("configuration file not found: {0}")]
    ConfigNotFound(String),

    /// Invalid configuration value.
    #[error("invalid configuration value for '{key}': {message}")]
    ConfigInvalid {
        /// The configuration key with invalid value.
        key: String,
        /// Error message describing why the value is invalid.
        message: String,
    },

    /// Malformed filter expression.
    #[error("filter error at offset {position}: {message}")]
    FilterParse {
        /// Byte offset in the expression where parsing stopped.
        position: usize,
        /// Error message describing the issue.
        message: String,
    },

    /// File or terminal I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for ectop operations.
pub type Result<T> = std::result::Result<T, EctopError>;
