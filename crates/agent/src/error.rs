//! Agent Transport Errors
//!
//! Error types shared by the HTTP and replay transports and the run
//! session driver.

use thiserror::Error;

use reportdeck_core::CoreError;

/// Errors produced while talking to the report agent.
#[derive(Error, Debug)]
pub enum AgentError {
    /// Network-level failure before or during streaming.
    #[error("Network error: {message}")]
    Network { message: String },

    /// The endpoint rejected the request with a non-success status.
    #[error("Agent endpoint returned HTTP {status}: {message}")]
    Endpoint { status: u16, message: String },

    /// The endpoint URL cannot carry a run path segment.
    #[error("Invalid agent endpoint: {message}")]
    InvalidEndpoint { message: String },

    /// A run continuation was requested without a run id.
    #[error("Missing run id: start a run before continuing it")]
    MissingRunId,

    /// A send was attempted while a response stream is already active.
    #[error("A response stream is already active for this run")]
    StreamActive,

    /// Core-level failure while handling recovered JSON.
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl AgentError {
    /// Create a network error from any displayable source.
    pub fn network(message: impl Into<String>) -> Self {
        AgentError::Network {
            message: message.into(),
        }
    }

    /// Create an invalid-endpoint error.
    pub fn invalid_endpoint(message: impl Into<String>) -> Self {
        AgentError::InvalidEndpoint {
            message: message.into(),
        }
    }
}

/// Map a non-success HTTP status to an agent error.
pub fn parse_endpoint_error(status: u16, body: &str) -> AgentError {
    let message = match status {
        404 => "run not found at this endpoint".to_string(),
        429 => "agent is busy, retry shortly".to_string(),
        500..=599 => format!("agent-side failure: {}", truncate_body(body)),
        _ => truncate_body(body),
    };
    AgentError::Endpoint { status, message }
}

/// Keep error bodies short enough for a log line.
fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    let trimmed = body.trim();
    if trimmed.len() <= MAX {
        trimmed.to_string()
    } else {
        let cut = trimmed
            .char_indices()
            .take_while(|(index, _)| *index < MAX)
            .last()
            .map(|(index, ch)| index + ch.len_utf8())
            .unwrap_or(MAX);
        format!("{}...", &trimmed[..cut])
    }
}

/// Convenience result alias for agent operations.
pub type AgentResult<T> = Result<T, AgentError>;
