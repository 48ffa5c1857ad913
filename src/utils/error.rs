//! Error Handling
//!
//! Unified error types for the application.
//! Uses thiserror for ergonomic error definitions. Errors from the agent
//! and core crates convert into `AppError` so command handlers share one
//! error surface.

use thiserror::Error;

use reportdeck_agent::AgentError;
use reportdeck_core::CoreError;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Agent transport and streaming errors
    #[error(transparent)]
    Agent(#[from] AgentError),

    /// Report recovery and normalization errors
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Not found errors
    #[error("Not found: {0}")]
    NotFound(String),
}

/// Result type alias for application errors
pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Create a config error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a not found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AppError::config("missing endpoint");
        assert_eq!(err.to_string(), "Configuration error: missing endpoint");
    }

    #[test]
    fn test_agent_error_conversion() {
        let err: AppError = AgentError::MissingRunId.into();
        assert!(matches!(err, AppError::Agent(_)));
        assert!(err.to_string().contains("Missing run id"));
    }

    #[test]
    fn test_core_error_conversion() {
        let err: AppError = CoreError::invalid_output("not a report").into();
        assert!(matches!(err, AppError::Core(_)));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let app_err: AppError = io_err.into();
        assert!(matches!(app_err, AppError::Io(_)));
    }
}
