//! Run Session Driver
//!
//! Drives one response stream end to end: chooses between starting and
//! continuing a run, decodes the byte stream, forwards text deltas over
//! a channel, folds strict-mode buffers, and honors cooperative
//! cancellation. A chunk already in flight when the caller cancels is
//! dropped rather than appended.

use futures_util::StreamExt;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use reportdeck_core::StrictJsonSession;

use crate::error::AgentResult;
use crate::protocol::Run;
use crate::transport::{AgentTransport, Utf8ChunkDecoder};

/// Events emitted while a response stream is being consumed.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// A decoded span of response text, in arrival order.
    TextDelta { content: String },
    /// Strict mode recovered a complete JSON document from the buffer.
    /// Emitted at most once per stream.
    ReportParsed,
}

/// How a consumed stream ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEnd {
    /// The endpoint closed the stream normally.
    Completed,
    /// The caller canceled mid-stream.
    Canceled,
    /// The transport failed mid-stream. Text received before the failure
    /// is kept in the outcome.
    Failed { message: String },
}

/// Everything accumulated while consuming one response stream.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamOutcome {
    /// Full decoded text of the response.
    pub text: String,
    /// Recovered strict report. Present only when strict mode was active,
    /// a document was found, and the stream completed normally.
    pub report: Option<Value>,
    /// How the stream ended.
    pub end: StreamEnd,
}

impl StreamOutcome {
    fn canceled(text: String) -> Self {
        Self {
            text,
            report: None,
            end: StreamEnd::Canceled,
        }
    }
}

/// Drives agent runs over a transport, tracking run lifecycle between
/// sends.
pub struct RunSession<T: AgentTransport> {
    transport: T,
    run: Run,
}

impl<T: AgentTransport> RunSession<T> {
    /// Session for a run that has not reached the endpoint yet.
    pub fn new(transport: T) -> Self {
        Self::with_run(transport, Run::new())
    }

    /// Session resuming a previously persisted run.
    pub fn with_run(transport: T, run: Run) -> Self {
        Self { transport, run }
    }

    /// The tracked run.
    pub fn run(&self) -> &Run {
        &self.run
    }

    /// Mutable access to the tracked run, for remembering strict
    /// requests and similar bookkeeping.
    pub fn run_mut(&mut self) -> &mut Run {
        &mut self.run
    }

    /// Consume the session, handing back the run for persistence.
    pub fn into_run(self) -> Run {
        self.run
    }

    /// Send a message and consume the full response stream.
    ///
    /// Starts a new run when no run id is known, continues the existing
    /// run otherwise. Decoded text is forwarded over `events` as it
    /// arrives; in strict mode every chunk is also folded into a JSON
    /// recovery buffer. Canceling `cancel` ends the stream early with a
    /// `Canceled` outcome and no report.
    ///
    /// Failures before the stream opens surface as `Err`. A transport
    /// failure after the stream opens ends it with a `Failed` outcome so
    /// callers keep the text received up to that point.
    pub async fn send(
        &mut self,
        message: &str,
        strict: bool,
        events: mpsc::Sender<StreamEvent>,
        cancel: CancellationToken,
    ) -> AgentResult<StreamOutcome> {
        self.run.begin_stream()?;
        let result = self.stream_response(message, strict, &events, &cancel).await;
        self.run.finish_stream();
        result
    }

    async fn stream_response(
        &mut self,
        message: &str,
        strict: bool,
        events: &mpsc::Sender<StreamEvent>,
        cancel: &CancellationToken,
    ) -> AgentResult<StreamOutcome> {
        let response = match self.run.run_id.clone() {
            Some(run_id) => self.transport.continue_run(&run_id, message).await?,
            None => self.transport.start_run(message).await?,
        };
        self.run.adopt_run_id(response.run_id);

        let mut stream = response.stream;
        let mut decoder = Utf8ChunkDecoder::new();
        let mut text = String::new();
        let mut fold = strict.then(StrictJsonSession::new);
        let mut report_seen = false;

        loop {
            let next = tokio::select! {
                _ = cancel.cancelled() => {
                    debug!("stream canceled while waiting for the next chunk");
                    return Ok(StreamOutcome::canceled(text));
                }
                next = stream.next() => next,
            };

            let Some(chunk) = next else { break };
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(error) => {
                    debug!(error = %error, "transport failed mid-stream");
                    return Ok(StreamOutcome {
                        text,
                        report: None,
                        end: StreamEnd::Failed {
                            message: error.to_string(),
                        },
                    });
                }
            };
            let decoded = decoder.decode(&chunk);

            // The reader-side cancellation check: a chunk that raced the
            // cancel is discarded, not appended.
            if cancel.is_cancelled() {
                debug!("stream canceled, dropping in-flight chunk");
                return Ok(StreamOutcome::canceled(text));
            }

            if decoded.is_empty() {
                continue;
            }

            text.push_str(&decoded);
            if let Some(fold) = fold.as_mut() {
                if fold.push_chunk(&decoded).is_some() && !report_seen {
                    report_seen = true;
                    let _ = events.send(StreamEvent::ReportParsed).await;
                }
            }
            let _ = events.send(StreamEvent::TextDelta { content: decoded }).await;
        }

        // End of stream: flush bytes the decoder held back, then run the
        // final recovery pass over the strict buffer.
        let tail = decoder.finish();
        if !tail.is_empty() {
            text.push_str(&tail);
            if let Some(fold) = fold.as_mut() {
                fold.push_chunk(&tail);
            }
            let _ = events.send(StreamEvent::TextDelta { content: tail }).await;
        }

        let report = fold.and_then(|fold| fold.finish().ok());
        Ok(StreamOutcome {
            text,
            report,
            end: StreamEnd::Completed,
        })
    }
}
