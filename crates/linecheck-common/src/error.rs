//! Error types for linecheck

use thiserror::Error;

/// Result type alias for linecheck operations
pub type Result<T> = std::result::Result<T, LinecheckError>;

/// Main error type for linecheck
#[derive(Error, Debug)]
pub enum LinecheckError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}
