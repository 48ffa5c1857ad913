//! Run Protocol
//!
//! Client-side lifecycle of an agent run: whether a run id is known,
//! whether a response stream is active, and the last strict report
//! request so it can be retried verbatim. The id and the remembered
//! request survive restarts; the streaming flag is runtime-only.

use serde::{Deserialize, Serialize};

use crate::error::{AgentError, AgentResult};

/// Runtime state of an agent run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RunState {
    /// Waiting for the next message.
    #[default]
    Idle,
    /// A response stream is currently being consumed.
    Streaming,
}

/// A strict report request remembered for retry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrictRequest {
    /// The exact outbound message, normally the trigger phrase.
    pub message: String,
    /// Analysis mode label active when the request was made.
    pub mode: String,
}

/// Client-side view of one agent run.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Run {
    /// Run id advertised by the endpoint, absent until the first
    /// response arrives.
    pub run_id: Option<String>,
    /// Current lifecycle state. Not persisted: a freshly loaded run is
    /// never mid-stream.
    #[serde(skip)]
    pub state: RunState,
    /// Last strict report request, kept for retry.
    pub last_strict_request: Option<StrictRequest>,
}

impl Run {
    /// A run that has not reached the endpoint yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// A run resumed from a previously advertised id.
    pub fn resumed(run_id: impl Into<String>) -> Self {
        Self {
            run_id: Some(run_id.into()),
            state: RunState::Idle,
            last_strict_request: None,
        }
    }

    /// True while a response stream is being consumed.
    pub fn is_streaming(&self) -> bool {
        self.state == RunState::Streaming
    }

    /// Mark the run as streaming. Fails when a stream is already active,
    /// so overlapping sends are rejected instead of interleaved.
    pub fn begin_stream(&mut self) -> AgentResult<()> {
        if self.is_streaming() {
            return Err(AgentError::StreamActive);
        }
        self.state = RunState::Streaming;
        Ok(())
    }

    /// Mark the stream finished. The run id is kept, so a canceled or
    /// failed stream still leaves the run resumable.
    pub fn finish_stream(&mut self) {
        self.state = RunState::Idle;
    }

    /// Record the run id advertised by a response. An id from a later
    /// response never replaces one already known.
    pub fn adopt_run_id(&mut self, run_id: Option<String>) {
        if self.run_id.is_none() {
            self.run_id = run_id;
        }
    }

    /// Remember a strict report request for later retry.
    pub fn remember_strict_request(&mut self, request: StrictRequest) {
        self.last_strict_request = Some(request);
    }
}
