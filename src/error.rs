//! Error types for driftgate
//!
//! This module defines the error types used throughout the crate.

use thiserror::Error;

/// Main error type for driftgate operations
#[derive(Error, Debug)]
pub enum DriftGateError {
    /// Configuration-related errors (bad split fractions, malformed config files)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data insufficiency errors (empty train split, impossible holdout)
    #[error("Data error: {0}")]
    Data(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl From<anyhow::Error> for DriftGateError {
    fn from(err: anyhow::Error) -> Self {
        DriftGateError::Other(err.to_string())
    }
}

/// Result type alias for driftgate operations
pub type Result<T> = std::result::Result<T, DriftGateError>;
