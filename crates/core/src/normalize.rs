//! Schema Normalizer
//!
//! Turns an arbitrary agent-produced JSON object into the canonical
//! [`ReportDocument`]. Agent output shapes drift across invocations, so
//! every canonical field is resolved through a prioritized alias table, and
//! the latest quarter, revenue series, and segment breakdown are derived
//! from whichever financial section the payload happens to carry. The
//! function is total: missing or malformed fields degrade to defaults, never
//! to an error.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde_json::Value;
use tracing::debug;

use crate::coerce::{
    display_or, display_string, is_truthy, normalize_confidence, str_to_number, to_number,
    value_by_aliases,
};
use crate::report::{
    ComparisonRow, ComputedMetrics, ExecutiveSummary, FinancialAnalysis, InferredInsight,
    InternalAnalysis, LatestQuarter, ObservedFact, ReportDocument, SegmentSlice, SeriesPoint,
    Source, SwotAnalysis,
};

/// Raw spellings of the public-financials section, original first so the
/// normalizer is idempotent on its own output.
const FINANCIAL_SECTION: [&str; 2] = ["financial_analysis_if_public", "financial_analysis"];
/// Raw spellings of the internal-data section.
const INTERNAL_SECTION: [&str; 2] = ["internal_data_analysis_if_provided", "internal_data_analysis"];
/// Raw spellings of the growth-plan field.
const GROWTH_PLAN_SECTION: [&str; 2] = ["30_60_90_day_growth_plan", "growth_plan"];

const REVENUE_ALIASES: [&str; 4] = ["revenue", "revenue_B", "revenue_b", "total revenue"];
const MARGIN_ALIASES: [&str; 7] = [
    "ebitda_margin",
    "ebitda margin",
    "ebitda_margin_pct",
    "operating margin",
    "op. margin",
    "gross_margin_pct",
    "gross margin",
];
const EPS_ALIASES: [&str; 4] = ["eps", "EPS", "gaap eps", "diluted eps"];
const SERIES_VALUE_ALIASES: [&str; 5] = ["value", "revenue", "revenue_B", "revenue_b", "total revenue"];
const SERIES_PERIOD_ALIASES: [&str; 4] = ["period", "fiscal_year", "fiscal year", "year"];
const STATEMENT_VALUE_ALIASES: [&str; 3] = ["total revenue", "revenue", "revenue_B"];
const SEGMENT_VALUE_ALIASES: [&str; 5] = [
    "value",
    "revenue",
    "FY2025_revenue_B",
    "revenue_B",
    "2024 Revenue",
];
const SEGMENT_PERF_VALUE_ALIASES: [&str; 3] = ["Revenue", "revenue", "2024 Revenue"];

/// Normalize an arbitrary agent payload into the canonical report.
///
/// The input is never mutated; the output is a freshly constructed,
/// fully-typed document. A non-object payload normalizes to the default
/// (empty) document.
pub fn normalize_report(raw: &Value) -> ReportDocument {
    if !raw.is_object() {
        return ReportDocument::default();
    }

    let sources = parse_sources(raw.get("sources"));
    let lookup = build_source_lookup(&sources);

    ReportDocument {
        executive_summary: normalize_executive_summary(raw),
        observed_facts: normalize_observed_facts(raw, &lookup),
        inferred_insights: normalize_inferred_insights(raw, &lookup),
        competitive_comparison_table: normalize_comparison_table(raw, &lookup),
        financial_analysis: FinancialAnalysis {
            latest_quarter: normalize_latest_quarter(raw, &sources),
        },
        internal_data_analysis: InternalAnalysis {
            computed_metrics: ComputedMetrics {
                revenue_timeseries: normalize_revenue_series(raw),
                segment_breakdown: normalize_segment_breakdown(raw),
            },
        },
        sources,
        swot_analysis: normalize_swot(raw),
        growth_plan: normalize_growth_plan(raw),
    }
}

// ── Sources & evidence ─────────────────────────────────────────────────

fn parse_sources(raw: Option<&Value>) -> Vec<Source> {
    let Some(Value::Array(entries)) = raw else {
        return Vec::new();
    };

    entries
        .iter()
        .filter(|entry| entry.is_object())
        .filter_map(|entry| serde_json::from_value(entry.clone()).ok())
        .collect()
}

/// Key used to match evidence pointers against source ids: the string form
/// of whatever scalar the agent used.
fn id_key(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

fn build_source_lookup(sources: &[Source]) -> HashMap<String, Source> {
    let mut lookup = HashMap::new();
    for source in sources {
        let Some(id) = source.id.as_ref().and_then(id_key) else {
            continue;
        };
        lookup.insert(id, source.clone());
    }
    lookup
}

/// Resolve a record's evidence identifiers against the run-scoped lookup.
/// Inline source objects (anything carrying a url) pass through; identifiers
/// with no matching source are dropped silently.
fn resolve_evidence(evidence: Option<&Value>, lookup: &HashMap<String, Source>) -> Vec<Source> {
    let Some(Value::Array(items)) = evidence else {
        return Vec::new();
    };

    items
        .iter()
        .filter(|item| is_truthy(item))
        .filter_map(|item| {
            if item.is_object() && item.get("url").is_some_and(is_truthy) {
                return serde_json::from_value(item.clone()).ok();
            }

            id_key(item).and_then(|id| lookup.get(&id).cloned())
        })
        .collect()
}

/// Sources for one fact/insight/row: an already-populated `sources` array
/// wins; otherwise the `evidence` pointers are resolved.
fn record_sources(record: &Value, lookup: &HashMap<String, Source>) -> Vec<Source> {
    if let Some(Value::Array(entries)) = record.get("sources") {
        if !entries.is_empty() {
            return entries
                .iter()
                .filter(|entry| entry.is_object())
                .filter_map(|entry| serde_json::from_value(entry.clone()).ok())
                .collect();
        }
    }

    resolve_evidence(record.get("evidence"), lookup)
}

// ── Narrative sections ─────────────────────────────────────────────────

fn normalize_executive_summary(raw: &Value) -> ExecutiveSummary {
    let executive = raw.get("executive_summary").unwrap_or(&Value::Null);

    let section_score = raw
        .get("confidence_scores")
        .and_then(|scores| scores.get("section_scores"))
        .and_then(|scores| scores.get("executive_summary"));

    let confidence = normalize_confidence(executive.get("confidence"))
        .or_else(|| normalize_confidence(section_score))
        .unwrap_or(0.0);

    ExecutiveSummary {
        thesis: display_or(
            value_by_aliases(executive, &["thesis", "overview", "summary", "headline"]),
            "",
        ),
        confidence,
    }
}

fn normalize_observed_facts(raw: &Value, lookup: &HashMap<String, Source>) -> Vec<ObservedFact> {
    as_array(raw.get("observed_facts"))
        .iter()
        .map(|fact| ObservedFact {
            text: display_or(
                value_by_aliases(fact, &["text", "fact", "statement", "summary", "headline"]),
                "",
            ),
            timestamp: value_by_aliases(fact, &["timestamp", "date"])
                .filter(|value| is_truthy(value))
                .map(display_string),
            sources: record_sources(fact, lookup),
        })
        .collect()
}

fn normalize_inferred_insights(
    raw: &Value,
    lookup: &HashMap<String, Source>,
) -> Vec<InferredInsight> {
    as_array(raw.get("inferred_insights"))
        .iter()
        .map(|insight| InferredInsight {
            text: display_or(
                value_by_aliases(insight, &["text", "insight", "summary", "headline"]),
                "",
            ),
            confidence: normalize_confidence(insight.get("confidence")).unwrap_or(0.0),
            assumptions: parse_assumptions(insight.get("assumptions")),
            sources: record_sources(insight, lookup),
        })
        .collect()
}

fn parse_assumptions(raw: Option<&Value>) -> Vec<String> {
    match raw {
        Some(Value::Array(items)) => items
            .iter()
            .filter(|item| is_truthy(item))
            .map(display_string)
            .collect(),
        Some(Value::String(text)) if !text.is_empty() => vec![text.clone()],
        _ => Vec::new(),
    }
}

fn normalize_comparison_table(raw: &Value, lookup: &HashMap<String, Source>) -> Vec<ComparisonRow> {
    as_array(raw.get("competitive_comparison_table"))
        .iter()
        .map(|row| ComparisonRow {
            name: display_or(
                value_by_aliases(row, &["name", "company", "competitor", "Company"]),
                "-",
            ),
            price: comparison_price(row),
            segment: display_or(
                value_by_aliases(row, &["segment", "focus", "market_segment", "EV Units (2024)"]),
                "-",
            ),
            differentiation: display_or(
                value_by_aliases(
                    row,
                    &[
                        "differentiation",
                        "AI_leadership",
                        "AI/AV Platform",
                        "product_breadth",
                        "Notes",
                    ],
                ),
                "-",
            ),
            sources: record_sources(row, lookup),
        })
        .collect()
}

fn comparison_price(row: &Value) -> String {
    let aliased = value_by_aliases(row, &["price", "pricing", "2024 Revenue", "FY2025_revenue_B"]);
    if let Some(value) = aliased.filter(|value| is_truthy(value)) {
        return display_string(value);
    }

    // A falsy revenue figure still renders as a revenue-scale label when the
    // row carried the field at all.
    match row.get("FY2025_revenue_B") {
        Some(value) if !value.is_null() => format!("${}B revenue", display_string(value)),
        _ => "-".to_string(),
    }
}

// ── Latest quarter ─────────────────────────────────────────────────────

/// Rank score for a summary-table row: the first present fiscal-year-like
/// key, coerced to a number. Unparseable rows sink to the bottom.
fn fiscal_year_score(row: &Value) -> f64 {
    ["fiscal_year", "year", "fiscalYear"]
        .iter()
        .find_map(|key| row.get(key).filter(|value| !value.is_null()))
        .and_then(to_number)
        .unwrap_or(f64::NEG_INFINITY)
}

fn pick_latest_year_row(summary_table: &[Value]) -> Option<Value> {
    if summary_table.is_empty() {
        return None;
    }

    let mut ranked: Vec<(f64, &Value)> = summary_table
        .iter()
        .map(|row| (fiscal_year_score(row), row))
        .collect();
    ranked.sort_by(|left, right| right.0.partial_cmp(&left.0).unwrap_or(Ordering::Equal));

    ranked
        .first()
        .map(|(_, row)| *row)
        .filter(|row| is_truthy(row))
        .or_else(|| summary_table.last().filter(|row| is_truthy(row)))
        .cloned()
}

/// Map one fiscal-period row onto the canonical latest-quarter shape.
fn latest_quarter_from_row(row: &Value, report_sources: &[Source]) -> LatestQuarter {
    let quarter = value_by_aliases(row, &["quarter", "fiscal_quarter", "fiscal quarter"])
        .filter(|value| is_truthy(value))
        .map(display_string)
        .or_else(|| {
            value_by_aliases(row, &["fiscal_year", "fiscal year", "year"])
                .filter(|value| is_truthy(value))
                .map(|year| format!("FY{}", display_string(year)))
        })
        .unwrap_or_else(|| "Latest year".to_string());

    let eps = match value_by_aliases(row, &EPS_ALIASES) {
        Some(value) if !value.is_null() => display_string(value),
        _ => "N/A".to_string(),
    };

    let source_url = value_by_aliases(row, &["source", "source_url"])
        .filter(|value| is_truthy(value))
        .map(display_string)
        .or_else(|| {
            report_sources
                .first()
                .map(|source| source.url.clone())
                .filter(|url| !url.is_empty())
        });

    LatestQuarter {
        quarter,
        revenue: value_by_aliases(row, &REVENUE_ALIASES)
            .and_then(to_number)
            .unwrap_or(0.0),
        ebitda_margin: normalize_confidence(value_by_aliases(row, &MARGIN_ALIASES)).unwrap_or(0.0),
        eps,
        source_url,
    }
}

fn normalize_latest_quarter(raw: &Value, report_sources: &[Source]) -> Option<LatestQuarter> {
    let financial = value_by_aliases(raw, &FINANCIAL_SECTION)?;

    if let Some(existing) = financial.get("latest_quarter").filter(|value| is_truthy(value)) {
        return Some(latest_quarter_from_row(existing, report_sources));
    }

    if let Some(row) = financial
        .get("summary_table")
        .and_then(Value::as_array)
        .and_then(|table| pick_latest_year_row(table))
    {
        debug!("latest quarter derived from summary table");
        return Some(latest_quarter_from_row(&row, report_sources));
    }

    let statement = financial.get("income_statement")?.as_object()?;
    let mut ranked: Vec<(f64, &String, &Value)> = statement
        .iter()
        .map(|(year, row)| (str_to_number(year).unwrap_or(f64::NEG_INFINITY), year, row))
        .collect();
    ranked.sort_by(|left, right| right.0.partial_cmp(&left.0).unwrap_or(Ordering::Equal));

    let (_, year, row) = ranked.first()?;
    let mut synthesized = row.as_object().cloned().unwrap_or_default();
    synthesized.insert("fiscal_year".to_string(), Value::String((*year).clone()));

    debug!(year = %year, "latest quarter derived from income statement");
    Some(latest_quarter_from_row(
        &Value::Object(synthesized),
        report_sources,
    ))
}

// ── Derived series ─────────────────────────────────────────────────────

fn normalize_revenue_series(raw: &Value) -> Vec<SeriesPoint> {
    let internal = value_by_aliases(raw, &INTERNAL_SECTION);
    if let Some(series) = internal
        .and_then(|section| section.get("computed_metrics"))
        .and_then(|metrics| metrics.get("revenue_timeseries"))
        .and_then(Value::as_array)
        .filter(|series| !series.is_empty())
    {
        return series
            .iter()
            .map(|entry| SeriesPoint {
                period: entry
                    .get("period")
                    .filter(|value| !value.is_null())
                    .map(display_string)
                    .unwrap_or_default(),
                value: entry.get("value").and_then(to_number).unwrap_or(0.0),
            })
            .collect();
    }

    let financial = value_by_aliases(raw, &FINANCIAL_SECTION);

    let summary_series: Vec<SeriesPoint> = as_array(financial.and_then(|f| f.get("summary_table")))
        .iter()
        .filter_map(|row| {
            let value = value_by_aliases(row, &SERIES_VALUE_ALIASES).and_then(to_number)?;
            let period = value_by_aliases(row, &SERIES_PERIOD_ALIASES)
                .filter(|period| !period.is_null())
                .map(display_string)
                .unwrap_or_default();
            Some(SeriesPoint { period, value })
        })
        .collect();

    if !summary_series.is_empty() {
        return summary_series;
    }

    let Some(statement) = financial
        .and_then(|f| f.get("income_statement"))
        .and_then(Value::as_object)
    else {
        return Vec::new();
    };

    let mut series: Vec<SeriesPoint> = statement
        .iter()
        .filter_map(|(period, row)| {
            let value = value_by_aliases(row, &STATEMENT_VALUE_ALIASES).and_then(to_number)?;
            Some(SeriesPoint::new(period.clone(), value))
        })
        .collect();

    series.sort_by(|left, right| {
        let left_year = str_to_number(&left.period).unwrap_or(f64::NEG_INFINITY);
        let right_year = str_to_number(&right.period).unwrap_or(f64::NEG_INFINITY);
        left_year.partial_cmp(&right_year).unwrap_or(Ordering::Equal)
    });

    series
}

fn normalize_segment_breakdown(raw: &Value) -> Vec<SegmentSlice> {
    let internal = value_by_aliases(raw, &INTERNAL_SECTION);
    if let Some(breakdown) = internal
        .and_then(|section| section.get("computed_metrics"))
        .and_then(|metrics| metrics.get("segment_breakdown"))
        .and_then(Value::as_array)
        .filter(|breakdown| !breakdown.is_empty())
    {
        return breakdown
            .iter()
            .map(|entry| SegmentSlice {
                segment: entry
                    .get("segment")
                    .filter(|value| !value.is_null())
                    .map(display_string)
                    .unwrap_or_default(),
                value: entry.get("value").and_then(to_number).unwrap_or(0.0),
            })
            .collect();
    }

    let financial = value_by_aliases(raw, &FINANCIAL_SECTION);

    let listed: Vec<SegmentSlice> = as_array(financial.and_then(|f| f.get("segment_breakdown")))
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| {
            let value = value_by_aliases(entry, &SEGMENT_VALUE_ALIASES).and_then(to_number)?;
            let segment = display_or(
                value_by_aliases(entry, &["segment", "name"]),
                &format!("Segment {}", index + 1),
            );
            Some(SegmentSlice { segment, value })
        })
        .collect();

    if !listed.is_empty() {
        return listed;
    }

    let Some(performance) = financial
        .and_then(|f| f.get("segment_perf"))
        .and_then(Value::as_object)
    else {
        return Vec::new();
    };

    performance
        .iter()
        .filter_map(|(segment, row)| {
            let value = value_by_aliases(row, &SEGMENT_PERF_VALUE_ALIASES).and_then(to_number)?;
            Some(SegmentSlice::new(segment.clone(), value))
        })
        .collect()
}

// ── Remaining sections ─────────────────────────────────────────────────

fn normalize_swot(raw: &Value) -> Option<SwotAnalysis> {
    let swot = raw.get("swot_analysis").filter(|value| value.is_object())?;

    let quadrant = |key: &str| -> Vec<String> {
        as_array(swot.get(key))
            .iter()
            .filter(|item| is_truthy(item))
            .map(display_string)
            .collect()
    };

    Some(SwotAnalysis {
        strengths: quadrant("strengths"),
        weaknesses: quadrant("weaknesses"),
        opportunities: quadrant("opportunities"),
        threats: quadrant("threats"),
    })
}

fn normalize_growth_plan(raw: &Value) -> Vec<String> {
    let steps: Vec<&Value> = match value_by_aliases(raw, &GROWTH_PLAN_SECTION) {
        Some(Value::Array(items)) => items.iter().collect(),
        Some(Value::Object(map)) => map.values().collect(),
        _ => Vec::new(),
    };

    steps
        .into_iter()
        .filter(|step| is_truthy(step))
        .map(|step| match step {
            Value::Array(parts) => parts
                .iter()
                .map(display_string)
                .collect::<Vec<_>>()
                .join(" "),
            other => display_string(other),
        })
        .filter(|step| !step.trim().is_empty())
        .collect()
}

fn as_array(value: Option<&Value>) -> &[Value] {
    value.and_then(Value::as_array).map(Vec::as_slice).unwrap_or(&[])
}
