//! Error types for the fitlog_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for fitlog_core operations
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

    /// Durable slot write rejected; the in-memory mutation has been rolled back
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Import payload is not the transport format
    #[error("Invalid data format: {0}")]
    ImportFormat(String),

    /// Import payload parsed but contained no structurally valid records
    #[error("No valid exercises found in import data")]
    ImportEmpty,

    /// Generic error
    #[error("{0}")]
    Other(String),
}
