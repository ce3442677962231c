//! Error types for magneto-core
//!
//! Only the plumbing can fail. Search and the diagnostic probe report their
//! outcomes as data.

use thiserror::Error;

/// Result type alias for magneto operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the jobs backend
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid HTTP method
    #[error("Invalid HTTP method: {0}")]
    InvalidMethod(String),

    /// Invalid bind address
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Response body could not be serialized
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Hyper error
    #[error("HTTP error: {0}")]
    Hyper(String),
}

impl From<hyper::Error> for Error {
    fn from(err: hyper::Error) -> Self {
        Error::Hyper(err.to_string())
    }
}
