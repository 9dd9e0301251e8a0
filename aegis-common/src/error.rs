//! Common error types for Aegis

use thiserror::Error;

/// Common result type for Aegis operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across Aegis services
#[derive(Error, Debug)]
pub enum Error {
    /// Object store operation failed (upload, download, or remote rejection)
    #[error("Storage error: {0}")]
    Storage(String),

    /// HTTP transport error (wraps reqwest::Error)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}
