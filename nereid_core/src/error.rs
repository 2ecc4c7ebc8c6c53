//! Error types for the nereid_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for nereid_core operations
///
/// Sparse or missing cycle data is never an error: the estimator and
/// predictor degrade to documented defaults. Errors are raised only where
/// caller input is normalized into core types, and by the persistence
/// helpers used by the surrounding layer.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Malformed caller input (dates, readings, labels, targets)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Externally produced predictions or goals failed validation
    #[error("Rejected remote update: {0}")]
    RemoteUpdate(String),
}
