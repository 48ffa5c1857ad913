//! Reportdeck Core
//!
//! Schema-tolerant report handling for the Reportdeck workspace: JSON
//! recovery from noisy streams, the canonical report document, and the
//! normalization and analytics passes that feed the dashboard views.
//! This crate has zero dependencies on transport or application code
//! (HTTP, persistence, CLI, etc.).
//!
//! ## Module Organization
//!
//! - `error` - Core error types (`CoreError`, `CoreResult`)
//! - `recovery` - Balanced-brace and fenced-block JSON extraction
//! - `strict` - Incremental strict-mode buffer folding (`StrictJsonSession`)
//! - `trigger` - The strict report trigger phrase
//! - `coerce` - Key canonicalization, alias lookup, and value coercion
//! - `report` - Canonical report document types (`ReportDocument`)
//! - `normalize` - Raw agent payload to canonical document
//! - `analytics` - Revenue override and growth-rate transforms
//!
//! ## Design Principles
//!
//! 1. **Pure functions over stateful services** - every pass takes a value in
//!    and hands a value back, so callers decide what to persist
//! 2. **Raw payloads are never mutated** - normalization and overrides build
//!    fresh documents, keeping stored reports replayable
//! 3. **Unidirectional dependency** - this crate depends on nothing else in
//!    the workspace

pub mod analytics;
pub mod coerce;
pub mod error;
pub mod normalize;
pub mod recovery;
pub mod report;
pub mod strict;
pub mod trigger;

// ── Error Types ────────────────────────────────────────────────────────
pub use error::{CoreError, CoreResult};

// ── JSON Recovery ──────────────────────────────────────────────────────
pub use recovery::{recover_json, try_parse_balanced_json, try_parse_fenced_json};

// ── Strict Mode ────────────────────────────────────────────────────────
pub use strict::{append_strict_chunk, finalize_strict_buffer, StrictJsonSession};
pub use trigger::{is_strict_report_trigger, STRICT_REPORT_TRIGGER};

// ── Report Document ────────────────────────────────────────────────────
pub use report::{
    ComparisonRow, ComputedMetrics, ExecutiveSummary, FinancialAnalysis, InferredInsight,
    InternalAnalysis, LatestQuarter, ObservedFact, ReportDocument, SegmentSlice, SeriesPoint,
    Source, SwotAnalysis,
};

// ── Normalization & Analytics ──────────────────────────────────────────
pub use analytics::{apply_revenue_override, compute_mom_growth, GrowthPoint};
pub use normalize::normalize_report;
