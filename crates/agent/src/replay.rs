//! Replay Transport
//!
//! An in-process stand-in for a live agent endpoint. Replays canned
//! report fixtures as chunked streams so the full strict-mode pipeline
//! runs without network access: the trigger phrase yields a raw JSON
//! report, anything else yields a markdown response with the report
//! inside a fenced block. Keywords in the message pick the fixture.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream::BoxStream;
use futures_util::StreamExt;
use uuid::Uuid;

use reportdeck_core::is_strict_report_trigger;

use crate::error::{AgentError, AgentResult};
use crate::transport::{AgentTransport, StreamedResponse};

const STRICT_REPORT: &str = include_str!("../fixtures/strict_report.json");
const PUBLIC_CO: &str = include_str!("../fixtures/public_co.json");
const PRIVATE_SAAS: &str = include_str!("../fixtures/private_saas.json");
const D2C_CUPCAKE: &str = include_str!("../fixtures/d2c_cupcake.json");

/// Replayed responses arrive in spans of at most this many characters.
const CHUNK_CHARS: usize = 80;

/// Transport that replays fixture reports instead of calling an agent.
#[derive(Debug, Clone, Default)]
pub struct ReplayTransport {
    chunk_delay: Duration,
}

impl ReplayTransport {
    /// Replay with no pacing between chunks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replay with a fixed delay between chunks, for demo pacing.
    pub fn with_chunk_delay(delay: Duration) -> Self {
        Self { chunk_delay: delay }
    }

    fn stream_for(&self, message: &str) -> BoxStream<'static, AgentResult<Bytes>> {
        let body = if is_strict_report_trigger(message) {
            STRICT_REPORT.to_string()
        } else {
            demo_markdown(message, select_fixture(message))
        };

        let delay = self.chunk_delay;
        futures_util::stream::iter(chunk_text(&body, CHUNK_CHARS))
            .then(move |chunk| async move {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                Ok::<Bytes, AgentError>(chunk)
            })
            .boxed()
    }
}

#[async_trait]
impl AgentTransport for ReplayTransport {
    async fn start_run(&self, message: &str) -> AgentResult<StreamedResponse> {
        Ok(StreamedResponse {
            run_id: Some(Uuid::new_v4().to_string()),
            stream: self.stream_for(message),
        })
    }

    async fn continue_run(&self, run_id: &str, message: &str) -> AgentResult<StreamedResponse> {
        if run_id.is_empty() {
            return Err(AgentError::MissingRunId);
        }
        Ok(StreamedResponse {
            run_id: None,
            stream: self.stream_for(message),
        })
    }
}

/// Pick a fixture by keywords in the message.
fn select_fixture(message: &str) -> &'static str {
    let lowered = message.to_lowercase();
    if lowered.contains("public") {
        PUBLIC_CO
    } else if lowered.contains("saas") {
        PRIVATE_SAAS
    } else {
        D2C_CUPCAKE
    }
}

/// A markdown response wrapping the fixture in a fenced JSON block.
fn demo_markdown(message: &str, fixture: &str) -> String {
    let shown = if message.is_empty() { "N/A" } else { message };
    format!(
        "## Demo stream\nProcessing request: {}\n\nSwitch to strict report mode by sending the exact trigger phrase.\n\n```json\n{}\n```\n",
        shown,
        fixture.trim_end()
    )
}

/// Split text into spans of at most `size` characters.
fn chunk_text(text: &str, size: usize) -> Vec<Bytes> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut count = 0;
    for ch in text.chars() {
        current.push(ch);
        count += 1;
        if count == size {
            chunks.push(Bytes::from(std::mem::take(&mut current)));
            count = 0;
        }
    }
    if !current.is_empty() {
        chunks.push(Bytes::from(current));
    }
    chunks
}
