//! Error types for the fund Q&A assistant

use thiserror::Error;

/// Result type alias for assistant operations
pub type Result<T> = std::result::Result<T, AssistantError>;

#[derive(Error, Debug)]
pub enum AssistantError {

    // =============================
    // Core Errors
    // =============================

    #[error("Data load error: {0}")]
    DataLoadError(String),

    #[error("Missing column '{column}' in {dataset}")]
    MissingColumn {
        dataset: &'static str,
        column: &'static str,
    },

    #[error("Classifier error: {0}")]
    ClassifierError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    // =============================
    // External Library Conversions
    // =============================

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
