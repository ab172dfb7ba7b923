//! Error types for dnswatch
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Result type alias for dnswatch operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for dnswatch
#[derive(Error, Debug)]
pub enum Error {
    /// Resolver-related errors (query failed, no answer, timeout)
    #[error("Resolver error: {0}")]
    Resolver(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Caller-supplied input was missing or malformed
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// No session exists for the requested domain
    #[error("Not found: {0}")]
    NotFound(String),

    /// Network-related errors
    #[error("Network error: {0}")]
    Network(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a resolver error
    pub fn resolver(msg: impl Into<String>) -> Self {
        Self::Resolver(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a "not found" error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Whether this error was caused by the caller's input
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }

    /// Whether this error reports a missing session
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
