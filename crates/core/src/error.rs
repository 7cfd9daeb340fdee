//! Error types for coursebot.
//!
//! This module defines a unified error enum covering configuration, I/O,
//! completion provider, retrieval, tool, and session failures.

use thiserror::Error;

/// Unified error type for coursebot.
///
/// All fallible functions return `Result<T, AppError>`.
/// Errors are represented and propagated, never panicked on.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Completion provider errors (fatal to the current query)
    #[error("LLM error: {0}")]
    Llm(String),

    /// Course store, ingestion and search errors
    #[error("Retrieval error: {0}")]
    Retrieval(String),

    /// Errors raised while executing a tool
    #[error("{0}")]
    Tool(String),

    /// Session store errors
    #[error("Session error: {0}")]
    Session(String),

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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_error_displays_bare_message() {
        let err = AppError::Tool("index offline".to_string());
        assert_eq!(err.to_string(), "index offline");
    }

    #[test]
    fn test_llm_error_is_prefixed() {
        let err = AppError::Llm("rate limited".to_string());
        assert_eq!(err.to_string(), "LLM error: rate limited");
    }

    #[test]
    fn test_json_error_maps_to_serialization() {
        let err: AppError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(matches!(err, AppError::Serialization(_)));
    }
}
