//! Reportdeck Agent
//!
//! Transport and run lifecycle for the report agent: start and continue
//! streaming runs over HTTP or replay canned fixtures in-process, then
//! drive the response stream through incremental UTF-8 decoding,
//! strict-mode JSON folding, and cooperative cancellation.
//!
//! ## Module Organization
//!
//! - `error` - Agent error types (`AgentError`, `AgentResult`)
//! - `transport` - The `AgentTransport` trait and HTTP implementation
//! - `replay` - Fixture-backed transport for demos and tests
//! - `protocol` - Client-side run lifecycle (`Run`, `StrictRequest`)
//! - `session` - The `RunSession` stream driver

pub mod error;
pub mod protocol;
pub mod replay;
pub mod session;
pub mod transport;

// ── Error Types ────────────────────────────────────────────────────────
pub use error::{AgentError, AgentResult};

// ── Transports ─────────────────────────────────────────────────────────
pub use replay::ReplayTransport;
pub use transport::{
    AgentTransport, HttpTransport, StreamedResponse, Utf8ChunkDecoder, DEFAULT_RUN_ID_HEADER,
};

// ── Run Protocol ───────────────────────────────────────────────────────
pub use protocol::{Run, RunState, StrictRequest};

// ── Session Driver ─────────────────────────────────────────────────────
pub use session::{RunSession, StreamEnd, StreamEvent, StreamOutcome};
