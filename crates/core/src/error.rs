//! Core Error Types
//!
//! Defines the error types used by the pure layer of the Reportdeck
//! workspace. These are dependency-light (thiserror + serde_json) so the
//! core crate stays cheap to build; the agent and application crates extend
//! them with transport and storage variants.

use thiserror::Error;

/// Core error type for the Reportdeck workspace.
///
/// Covers the two ways the pure layer can fail: serializing/deserializing a
/// canonical document, and finishing a strict-mode stream without a
/// recoverable JSON value.
#[derive(Error, Debug)]
pub enum CoreError {
    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A completed strict-mode stream held no parseable JSON document
    #[error("Invalid structured output: {0}")]
    InvalidOutput(String),
}

/// Result type alias for core errors
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// Create an invalid-output error
    pub fn invalid_output(msg: impl Into<String>) -> Self {
        Self::InvalidOutput(msg.into())
    }
}

/// Convert CoreError to a string
impl From<CoreError> for String {
    fn from(err: CoreError) -> String {
        err.to_string()
    }
}
