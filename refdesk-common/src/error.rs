//! Common error types for refdesk

use thiserror::Error;

/// Common result type for refdesk operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across refdesk crates
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Record file (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Record index outside the current store
    #[error("Record index {index} out of range (store holds {len} records)")]
    IndexOutOfRange { index: usize, len: usize },
}
