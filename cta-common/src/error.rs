//! Common error types for CTA

use thiserror::Error;

/// Common result type for CTA operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types shared by the CTA crates
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encode/decode error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid user input (unknown layout, kind or format token)
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
