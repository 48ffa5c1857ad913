//! Canonical Report Schema
//!
//! The fixed target shape every heterogeneous agent payload is normalized
//! into before display or export. Instances are produced exclusively by the
//! normalizer and are never mutated in place: every transform returns a new
//! document.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::CoreResult;

/// A cited source attached to facts, insights, and comparison rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Source {
    /// Identifier used by evidence pointers in the raw payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    /// Where the claim comes from
    #[serde(default)]
    pub url: String,
    /// Supporting excerpt, when the agent provided one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
    /// How the source was retrieved (search, crawl, upload, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retrieval_method: Option<String>,
    /// Agent-assigned credibility in [0,1]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credibility_score: Option<f64>,
}

impl Source {
    /// Create a source from a bare url
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }
}

/// Executive summary section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ExecutiveSummary {
    /// One-paragraph investment thesis
    #[serde(default)]
    pub thesis: String,
    /// Normalized confidence in [0,1]
    #[serde(default)]
    pub confidence: f64,
}

/// A directly observed, sourceable fact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ObservedFact {
    /// Fact statement
    #[serde(default)]
    pub text: String,
    /// Observation timestamp or date label, when provided
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    /// Resolved sources backing the fact
    #[serde(default)]
    pub sources: Vec<Source>,
}

/// An inference the agent drew from the facts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct InferredInsight {
    /// Insight statement
    #[serde(default)]
    pub text: String,
    /// Normalized confidence in [0,1]
    #[serde(default)]
    pub confidence: f64,
    /// Stated assumptions behind the inference
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assumptions: Vec<String>,
    /// Resolved sources backing the insight
    #[serde(default)]
    pub sources: Vec<Source>,
}

/// One row of the competitive comparison table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ComparisonRow {
    /// Competitor name
    #[serde(default)]
    pub name: String,
    /// Pricing or revenue-scale display value
    #[serde(default)]
    pub price: String,
    /// Market segment or focus area
    #[serde(default)]
    pub segment: String,
    /// What sets the competitor apart
    #[serde(default)]
    pub differentiation: String,
    /// Resolved sources backing the row
    #[serde(default)]
    pub sources: Vec<Source>,
}

/// Most recent public reporting period.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct LatestQuarter {
    /// Period label: explicit quarter, "FY{year}", or "Latest year"
    #[serde(default)]
    pub quarter: String,
    /// Reported revenue for the period
    #[serde(default)]
    pub revenue: f64,
    /// Margin normalized to [0,1]
    #[serde(default)]
    pub ebitda_margin: f64,
    /// Earnings per share display value; "N/A" when unreported
    #[serde(default)]
    pub eps: String,
    /// Filing or article the figures come from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
}

/// Public-company financial section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct FinancialAnalysis {
    /// Latest reporting period, derived when not supplied directly
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_quarter: Option<LatestQuarter>,
}

/// One point of the revenue time series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SeriesPoint {
    /// Period label (fiscal year, quarter, month)
    #[serde(default)]
    pub period: String,
    /// Revenue value for the period
    #[serde(default)]
    pub value: f64,
}

impl SeriesPoint {
    /// Create a series point
    pub fn new(period: impl Into<String>, value: f64) -> Self {
        Self {
            period: period.into(),
            value,
        }
    }
}

/// One slice of the segment revenue breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SegmentSlice {
    /// Segment name
    #[serde(default)]
    pub segment: String,
    /// Revenue attributed to the segment
    #[serde(default)]
    pub value: f64,
}

impl SegmentSlice {
    /// Create a segment slice
    pub fn new(segment: impl Into<String>, value: f64) -> Self {
        Self {
            segment: segment.into(),
            value,
        }
    }
}

/// Metrics derived from internal data the caller provided to the agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ComputedMetrics {
    /// Revenue over time, oldest first
    #[serde(default)]
    pub revenue_timeseries: Vec<SeriesPoint>,
    /// Revenue by business segment
    #[serde(default)]
    pub segment_breakdown: Vec<SegmentSlice>,
}

/// Internal-data analysis section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct InternalAnalysis {
    /// Derived metrics used by charts and the override transform
    #[serde(default)]
    pub computed_metrics: ComputedMetrics,
}

/// SWOT quadrant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SwotAnalysis {
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
    #[serde(default)]
    pub opportunities: Vec<String>,
    #[serde(default)]
    pub threats: Vec<String>,
}

/// The canonical business-analytics report.
///
/// Confidence and margin fields are always in [0,1] regardless of the scale
/// the agent used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ReportDocument {
    /// Thesis and overall confidence
    #[serde(default)]
    pub executive_summary: ExecutiveSummary,
    /// Directly observed facts with resolved sources
    #[serde(default)]
    pub observed_facts: Vec<ObservedFact>,
    /// Inferences with normalized confidence
    #[serde(default)]
    pub inferred_insights: Vec<InferredInsight>,
    /// Competitor comparison rows
    #[serde(default)]
    pub competitive_comparison_table: Vec<ComparisonRow>,
    /// Public financials, including the derived latest quarter
    #[serde(default)]
    pub financial_analysis: FinancialAnalysis,
    /// Internal-data metrics, including derived series
    #[serde(default)]
    pub internal_data_analysis: InternalAnalysis,
    /// Top-level source list the evidence pointers resolve against
    #[serde(default)]
    pub sources: Vec<Source>,
    /// SWOT quadrant, when the agent produced one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swot_analysis: Option<SwotAnalysis>,
    /// Flattened 30/60/90-day growth plan steps
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub growth_plan: Vec<String>,
}

impl ReportDocument {
    /// Serialize for export or storage as formatted JSON.
    pub fn to_pretty_json(&self) -> CoreResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load a previously stored canonical document.
    pub fn from_json_str(raw: &str) -> CoreResult<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}
