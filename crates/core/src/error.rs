//! Error types for the Caduceus assistant.
//!
//! This module defines a unified error enum that covers all error categories
//! in the application: configuration, I/O, retrieval, generation, prompt,
//! storage, and input validation.

use thiserror::Error;

/// Unified error type for the Caduceus assistant.
///
/// All fallible functions in the workspace return `Result<T, AppError>`.
/// We never panic — errors must be represented and propagated. Recovery
/// policies (fallback answers) are layered on top of these types, not
/// encoded in them.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Retrieval backend errors (RAG server transport or malformed response)
    #[error("Retrieval error: {0}")]
    Retrieval(String),

    /// Generation backend errors (LLM transport or malformed response)
    #[error("Generation error: {0}")]
    Generation(String),

    /// Prompt construction errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// File storage backend errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Rejected user input (e.g., an empty question)
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
