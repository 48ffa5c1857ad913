//! Chat Service
//!
//! Drives one chat turn against the agent: decorates the outbound
//! message, engages strict JSON mode when the report trigger phrase is
//! sent, maps the stream outcome to a transcript message, and keeps the
//! store in sync with the transcript, the stored report and the session
//! pointer.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use reportdeck_agent::{
    AgentError, AgentTransport, Run, RunSession, StreamEnd, StreamEvent, StreamOutcome,
    StrictRequest,
};
use reportdeck_core::{is_strict_report_trigger, STRICT_REPORT_TRIGGER};

use crate::models::message::ChatMessage;
use crate::storage::store::{RunStore, SessionSnapshot};
use crate::utils::error::{AppError, AppResult};

/// What a send left behind, beyond the persisted transcript
#[derive(Debug)]
pub struct SendReport {
    /// The assistant message appended to the transcript
    pub assistant: ChatMessage,
    /// True when a strict report was parsed and stored
    pub report_stored: bool,
    /// Notice for the caller to surface outside the transcript, if any
    pub notice: Option<String>,
    /// How the stream ended; requests that failed before streaming
    /// surface as `Failed`
    pub end: StreamEnd,
}

/// Handles chat turns for the current run
pub struct ChatService<T: AgentTransport> {
    store: RunStore,
    session: RunSession<T>,
    transcript: Vec<ChatMessage>,
    default_mode: String,
}

impl<T: AgentTransport> ChatService<T> {
    /// Resume the persisted session, or start fresh when none exists
    pub fn resume(store: RunStore, transport: T, default_mode: impl Into<String>) -> AppResult<Self> {
        let snapshot = store.load_session()?;
        let run = snapshot.current_run.unwrap_or_default();
        let transcript = match run.run_id.as_deref() {
            Some(run_id) => store.load_transcript(run_id)?,
            None => Vec::new(),
        };

        Ok(Self {
            store,
            session: RunSession::with_run(transport, run),
            transcript,
            default_mode: default_mode.into(),
        })
    }

    /// The run the service is operating on
    pub fn run(&self) -> &Run {
        self.session.run()
    }

    /// The in-memory transcript, including messages loaded from disk
    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    /// Send a chat message. Typing the report trigger phrase engages
    /// strict JSON mode; any other message is decorated with the
    /// analysis mode label.
    pub async fn send_message(
        &mut self,
        message: &str,
        mode: Option<&str>,
        events: mpsc::Sender<StreamEvent>,
        cancel: CancellationToken,
    ) -> AppResult<SendReport> {
        let mode = mode.unwrap_or(&self.default_mode).to_string();
        let strict = is_strict_report_trigger(message);
        let outbound = if strict {
            STRICT_REPORT_TRIGGER.to_string()
        } else {
            format!("[{} mode] {}", mode, message)
        };
        self.dispatch(outbound, mode, strict, events, cancel).await
    }

    /// Request a full structured report in strict JSON mode
    pub async fn request_report(
        &mut self,
        mode: Option<&str>,
        events: mpsc::Sender<StreamEvent>,
        cancel: CancellationToken,
    ) -> AppResult<SendReport> {
        let mode = mode.unwrap_or(&self.default_mode).to_string();
        self.dispatch(STRICT_REPORT_TRIGGER.to_string(), mode, true, events, cancel)
            .await
    }

    /// Re-send the last strict report request verbatim
    pub async fn retry_report(
        &mut self,
        events: mpsc::Sender<StreamEvent>,
        cancel: CancellationToken,
    ) -> AppResult<SendReport> {
        let request = self
            .session
            .run()
            .last_strict_request
            .clone()
            .ok_or_else(|| AppError::validation("No strict report request to retry"))?;
        self.dispatch(request.message, request.mode, true, events, cancel)
            .await
    }

    async fn dispatch(
        &mut self,
        outbound: String,
        mode: String,
        strict: bool,
        events: mpsc::Sender<StreamEvent>,
        cancel: CancellationToken,
    ) -> AppResult<SendReport> {
        if self.session.run().is_streaming() {
            return Err(AppError::Agent(AgentError::StreamActive));
        }

        // Remember the strict request before sending so retry works even
        // when this attempt fails.
        if strict {
            self.session.run_mut().remember_strict_request(StrictRequest {
                message: outbound.clone(),
                mode,
            });
        }
        self.transcript.push(ChatMessage::user(&outbound));
        debug!(strict, "dispatching chat message");

        let result = self.session.send(&outbound, strict, events, cancel).await;
        let report = match result {
            Ok(outcome) => self.outcome_report(strict, outcome)?,
            Err(error) => {
                // The request failed before any stream opened.
                warn!(error = %error, "agent request failed");
                let message = error.to_string();
                SendReport {
                    assistant: ChatMessage::assistant(stream_failure_message(&message)),
                    report_stored: false,
                    notice: None,
                    end: StreamEnd::Failed { message },
                }
            }
        };

        self.transcript.push(report.assistant.clone());
        self.persist()?;
        Ok(report)
    }

    fn outcome_report(&mut self, strict: bool, outcome: StreamOutcome) -> AppResult<SendReport> {
        let mut report_stored = false;
        let mut notice = None;
        let end = outcome.end.clone();

        let assistant = match outcome.end {
            StreamEnd::Completed if strict => match outcome.report {
                Some(report) => {
                    if let Some(run_id) = self.session.run().run_id.clone() {
                        self.store.save_report(&run_id, &report)?;
                        report_stored = true;
                        info!(run_id = %run_id, "strict report stored");
                    }
                    ChatMessage::assistant("Report generated. Open it with the show command.")
                        .with_report_payload()
                }
                None => ChatMessage::assistant(
                    "Agent returned invalid JSON. Ask the agent to retry or try again.",
                ),
            },
            StreamEnd::Completed => ChatMessage::assistant(outcome.text),
            StreamEnd::Canceled => {
                if strict {
                    notice = Some(
                        "Structured report generation was canceled. Retry to request JSON again."
                            .to_string(),
                    );
                }
                ChatMessage::assistant(format!("{}\n\n_Stream canceled by user._", outcome.text))
            }
            StreamEnd::Failed { message } => {
                warn!(error = %message, "stream failed mid-response");
                if outcome.text.is_empty() {
                    ChatMessage::assistant(stream_failure_message(&message))
                } else {
                    ChatMessage::assistant(outcome.text)
                }
            }
        };

        Ok(SendReport {
            assistant,
            report_stored,
            notice,
            end,
        })
    }

    fn persist(&self) -> AppResult<()> {
        if let Some(run_id) = self.session.run().run_id.as_deref() {
            self.store.save_transcript(run_id, &self.transcript)?;
            self.store.touch_run(run_id)?;
        }
        self.store.save_session(&SessionSnapshot {
            current_run: Some(self.session.run().clone()),
        })
    }
}

fn stream_failure_message(error: &str) -> String {
    format!(
        "Unable to stream response: {}. You can retry or switch to replay mode.",
        error
    )
}
