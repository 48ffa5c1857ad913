//! Chat Transcript Models
//!
//! Data structures for the message transcript kept per run.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who authored a transcript message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

/// One message in a run transcript
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Unique message identifier
    pub id: String,
    /// Message author
    pub role: Role,
    /// Message text content
    pub content: String,
    /// Creation timestamp (ISO 8601)
    pub timestamp: String,
    /// True when this assistant message announces a stored report
    #[serde(default)]
    pub has_report_payload: bool,
}

impl ChatMessage {
    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Create an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            has_report_payload: false,
        }
    }

    /// Mark this message as carrying a stored report
    pub fn with_report_payload(mut self) -> Self {
        self.has_report_payload = true;
        self
    }
}
