//! Error types for the data-loader crate.

use thiserror::Error;

/// Errors that can occur while loading video data and playlist profiles
#[derive(Error, Debug)]
pub enum DataLoadError {
    /// File could not be found or opened
    #[error("Failed to open file: {path}")]
    FileNotFound { path: String },

    /// I/O error occurred while reading file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Document in a data file couldn't be parsed
    #[error("Parse error in {file}: {reason}")]
    ParseError { file: String, reason: String },

    /// A data field had an invalid value
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    /// Two entries share the same video id
    #[error("Duplicate video id: {0}")]
    DuplicateVideo(String),

    /// Data validation failed
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, DataLoadError>;
