//! Error types for the intent classifier

use thiserror::Error;

/// Result type alias for classifier operations
pub type Result<T> = std::result::Result<T, ClassifierError>;

#[derive(Error, Debug)]
pub enum ClassifierError {

    // =============================
    // Pipeline Errors
    // =============================

    #[error("Input error: {0}")]
    InputError(String),

    #[error("Model error: {0}")]
    ModelError(String),

    #[error("Invalid model response: {0}")]
    InvalidModelResponse(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Report error: {0}")]
    ReportError(String),

    // =============================
    // External Library Conversions
    // =============================

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
