//! Agent Transport
//!
//! The wire protocol for talking to a report agent endpoint: a run is
//! started with a POST to the endpoint and continued with a PUT to
//! `{endpoint}/{run_id}`. The response body is streamed back chunk by
//! chunk, and the run id travels in a response header so the caller can
//! resume the same agent conversation later.

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::stream::BoxStream;
use futures_util::StreamExt;
use tracing::debug;
use url::Url;

use crate::error::{parse_endpoint_error, AgentError, AgentResult};

/// Default response header carrying the run id.
pub const DEFAULT_RUN_ID_HEADER: &str = "x-agent-run-id";

/// A streamed agent response.
pub struct StreamedResponse {
    /// Run id advertised by the endpoint, absent when the response did
    /// not carry the header.
    pub run_id: Option<String>,
    /// Raw body bytes in arrival order.
    pub stream: BoxStream<'static, AgentResult<Bytes>>,
}

impl std::fmt::Debug for StreamedResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamedResponse")
            .field("run_id", &self.run_id)
            .field("stream", &"<BoxStream>")
            .finish()
    }
}

/// Transport over which agent runs are started and continued.
#[async_trait]
pub trait AgentTransport: Send + Sync {
    /// Start a new run with the given outbound message.
    async fn start_run(&self, message: &str) -> AgentResult<StreamedResponse>;

    /// Continue an existing run with a follow-up message.
    async fn continue_run(&self, run_id: &str, message: &str) -> AgentResult<StreamedResponse>;
}

#[async_trait]
impl<T: AgentTransport + ?Sized> AgentTransport for Box<T> {
    async fn start_run(&self, message: &str) -> AgentResult<StreamedResponse> {
        (**self).start_run(message).await
    }

    async fn continue_run(&self, run_id: &str, message: &str) -> AgentResult<StreamedResponse> {
        (**self).continue_run(run_id, message).await
    }
}

/// HTTP transport backed by a reqwest client.
pub struct HttpTransport {
    endpoint: String,
    run_id_header: String,
    client: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport for the given endpoint URL, reading run ids
    /// from the default header.
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self::with_run_id_header(endpoint, DEFAULT_RUN_ID_HEADER)
    }

    /// Create a transport that reads run ids from a custom header.
    pub fn with_run_id_header(endpoint: impl Into<String>, header: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            run_id_header: header.into().to_lowercase(),
            client: reqwest::Client::new(),
        }
    }

    /// URL for continuing a run: the endpoint with the run id appended
    /// as one percent-encoded path segment.
    fn continue_url(&self, run_id: &str) -> AgentResult<String> {
        let mut url = Url::parse(&self.endpoint)
            .map_err(|e| AgentError::invalid_endpoint(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| AgentError::invalid_endpoint("endpoint URL cannot carry a run path"))?
            .pop_if_empty()
            .push(run_id);
        Ok(url.into())
    }

    /// Convert a reqwest response into a streamed response, surfacing
    /// non-success statuses as errors.
    async fn into_streamed(&self, response: reqwest::Response) -> AgentResult<StreamedResponse> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .map_err(|e| AgentError::network(e.to_string()))?;
            return Err(parse_endpoint_error(status.as_u16(), &body));
        }

        let run_id = response
            .headers()
            .get(&self.run_id_header)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.to_string());

        let stream = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| AgentError::network(e.to_string())))
            .boxed();

        Ok(StreamedResponse { run_id, stream })
    }
}

#[async_trait]
impl AgentTransport for HttpTransport {
    async fn start_run(&self, message: &str) -> AgentResult<StreamedResponse> {
        debug!(endpoint = %self.endpoint, "starting agent run");
        let response = self
            .client
            .post(&self.endpoint)
            .json(&serde_json::json!({ "message": message }))
            .send()
            .await
            .map_err(|e| AgentError::network(e.to_string()))?;
        self.into_streamed(response).await
    }

    async fn continue_run(&self, run_id: &str, message: &str) -> AgentResult<StreamedResponse> {
        if run_id.is_empty() {
            return Err(AgentError::MissingRunId);
        }
        let url = self.continue_url(run_id)?;
        debug!(%url, "continuing agent run");
        let response = self
            .client
            .put(url)
            .json(&serde_json::json!({ "message": message }))
            .send()
            .await
            .map_err(|e| AgentError::network(e.to_string()))?;
        self.into_streamed(response).await
    }
}

/// Incremental UTF-8 decoder for byte streams that may split multi-byte
/// sequences across chunk boundaries.
///
/// An incomplete trailing sequence is held back until the next chunk
/// arrives; genuinely malformed bytes are replaced rather than dropped.
#[derive(Debug, Default)]
pub struct Utf8ChunkDecoder {
    pending: Vec<u8>,
}

impl Utf8ChunkDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode the next chunk, returning every complete character seen so
    /// far including bytes carried over from previous chunks.
    pub fn decode(&mut self, chunk: &[u8]) -> String {
        self.pending.extend_from_slice(chunk);
        match std::str::from_utf8(&self.pending) {
            Ok(text) => {
                let text = text.to_string();
                self.pending.clear();
                text
            }
            Err(error) if error.error_len().is_none() => {
                // Incomplete trailing sequence: emit the valid prefix and
                // keep the rest for the next chunk.
                let valid_up_to = error.valid_up_to();
                let text = String::from_utf8_lossy(&self.pending[..valid_up_to]).into_owned();
                self.pending.drain(..valid_up_to);
                text
            }
            Err(_) => {
                let text = String::from_utf8_lossy(&self.pending).into_owned();
                self.pending.clear();
                text
            }
        }
    }

    /// Flush any bytes still pending at the end of the stream.
    pub fn finish(&mut self) -> String {
        if self.pending.is_empty() {
            return String::new();
        }
        let text = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        text
    }
}
