//! Strict JSON Streaming Mode
//!
//! Incremental recovery of a structured document from a chunked stream. The
//! algorithm is a pure fold: `(buffer, chunk) -> buffer'` plus a "parseable
//! yet" query, so it is testable with no transport attached. A stateful
//! session wrapper carries the buffer and the first successful parse across
//! chunks for stream drivers.

use serde_json::Value;

use crate::error::{CoreError, CoreResult};
use crate::recovery::recover_json;

/// Append one chunk to the strict-mode buffer and attempt recovery.
///
/// Returns the grown buffer and the parse result, if any. Pure given its
/// inputs; the caller owns the buffer between calls.
pub fn append_strict_chunk(buffer: &str, chunk: &str) -> (String, Option<Value>) {
    let next_buffer = format!("{buffer}{chunk}");
    let parsed = recover_json(&next_buffer);
    (next_buffer, parsed)
}

/// Final recovery attempt once the stream has ended.
///
/// Re-runs both extraction strategies over the complete buffer. This catches
/// a payload whose closing brace or closing fence arrived on the very last
/// chunk, after the last incremental attempt.
pub fn finalize_strict_buffer(buffer: &str) -> Option<Value> {
    recover_json(buffer)
}

/// Stateful strict-mode session over the pure fold.
///
/// Keeps the accumulated buffer and the first successfully parsed value.
/// Later chunks never replace an already-recovered document: the buffer may
/// keep growing with trailing prose, but the result is fixed at most once.
#[derive(Debug, Default)]
pub struct StrictJsonSession {
    buffer: String,
    parsed: Option<Value>,
}

impl StrictJsonSession {
    /// Create a session with an empty buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk; returns the recovered document if one is available.
    pub fn push_chunk(&mut self, chunk: &str) -> Option<&Value> {
        let (next_buffer, parsed) = append_strict_chunk(&self.buffer, chunk);
        self.buffer = next_buffer;

        if self.parsed.is_none() {
            self.parsed = parsed;
        }

        self.parsed.as_ref()
    }

    /// The accumulated buffer so far.
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// The recovered document, if incremental feeding has found one.
    pub fn parsed(&self) -> Option<&Value> {
        self.parsed.as_ref()
    }

    /// Consume the session after end-of-stream.
    ///
    /// Returns the incrementally recovered document, or the result of one
    /// final recovery pass over the whole buffer. Failing both is the
    /// "invalid structured output" condition: the caller surfaces it to the
    /// user and may replay the request.
    pub fn finish(self) -> CoreResult<Value> {
        if let Some(parsed) = self.parsed {
            return Ok(parsed);
        }

        finalize_strict_buffer(&self.buffer).ok_or_else(|| {
            CoreError::invalid_output("stream ended without a parseable JSON document")
        })
    }

    /// Clear the buffer and any recovered document for reuse.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.parsed = None;
    }
}
