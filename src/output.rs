//! Terminal Output Rendering
//!
//! Pure render functions that turn normalized reports, run listings and
//! configuration into display text. Commands print the returned strings;
//! nothing here touches stdout directly.

use std::fmt::Write;

use chrono::DateTime;

use reportdeck_core::{compute_mom_growth, ReportDocument};

use crate::models::run::RunIndexEntry;
use crate::models::settings::AppConfig;

/// Render the report dashboard for a run.
///
/// Sections the agent did not populate are omitted, matching how the
/// report is displayed as a set of optional panels.
pub fn render_report(run_id: &str, report: &ReportDocument, growth: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Run: {}", run_id);

    let summary = &report.executive_summary;
    if !summary.thesis.is_empty() || summary.confidence > 0.0 {
        let _ = writeln!(out, "\nExecutive Summary");
        if !summary.thesis.is_empty() {
            let _ = writeln!(out, "  {}", summary.thesis);
        }
        let _ = writeln!(out, "  Confidence: {:.0}%", summary.confidence * 100.0);
    }

    if let Some(quarter) = &report.financial_analysis.latest_quarter {
        let _ = writeln!(out, "\nLatest Quarter ({})", quarter.quarter);
        let _ = writeln!(out, "  Revenue:       {}", fmt_amount(quarter.revenue));
        let _ = writeln!(
            out,
            "  EBITDA margin: {:.1}%",
            quarter.ebitda_margin * 100.0
        );
        let _ = writeln!(out, "  EPS:           {}", quarter.eps);
        if let Some(url) = &quarter.source_url {
            let _ = writeln!(out, "  Source:        {}", url);
        }
    }

    let series = &report.internal_data_analysis.computed_metrics.revenue_timeseries;
    if !series.is_empty() {
        let _ = writeln!(out, "\nRevenue Trend");
        if growth {
            for point in compute_mom_growth(series) {
                let _ = writeln!(
                    out,
                    "  {:<12} {:>12}  {:>+7.2}%",
                    point.period,
                    fmt_amount(point.value),
                    point.growth_pct
                );
            }
        } else {
            for point in series {
                let _ = writeln!(out, "  {:<12} {:>12}", point.period, fmt_amount(point.value));
            }
        }
    }

    let segments = &report.internal_data_analysis.computed_metrics.segment_breakdown;
    if !segments.is_empty() {
        let _ = writeln!(out, "\nSegment Breakdown");
        for slice in segments {
            let _ = writeln!(out, "  {:<20} {:>12}", slice.segment, fmt_amount(slice.value));
        }
    }

    if !report.observed_facts.is_empty() {
        let _ = writeln!(out, "\nObserved Facts ({})", report.observed_facts.len());
        for (i, fact) in report.observed_facts.iter().enumerate() {
            match &fact.timestamp {
                Some(ts) => {
                    let _ = writeln!(out, "  {}. {} ({})", i + 1, fact.text, ts);
                }
                None => {
                    let _ = writeln!(out, "  {}. {}", i + 1, fact.text);
                }
            }
            for source in &fact.sources {
                if !source.url.is_empty() {
                    let _ = writeln!(out, "     source: {}", source.url);
                }
            }
        }
    }

    if !report.inferred_insights.is_empty() {
        let _ = writeln!(out, "\nInferred Insights ({})", report.inferred_insights.len());
        for (i, insight) in report.inferred_insights.iter().enumerate() {
            let _ = writeln!(
                out,
                "  {}. [{:.0}%] {}",
                i + 1,
                insight.confidence * 100.0,
                insight.text
            );
        }
    }

    if !report.competitive_comparison_table.is_empty() {
        let _ = writeln!(out, "\nCompetitive Comparison");
        for row in &report.competitive_comparison_table {
            let _ = writeln!(
                out,
                "  - {} | {} | {} | {}",
                row.name, row.price, row.segment, row.differentiation
            );
        }
    }

    if let Some(swot) = &report.swot_analysis {
        let _ = writeln!(out, "\nSWOT");
        let _ = writeln!(out, "  Strengths:     {}", swot.strengths.join("; "));
        let _ = writeln!(out, "  Weaknesses:    {}", swot.weaknesses.join("; "));
        let _ = writeln!(out, "  Opportunities: {}", swot.opportunities.join("; "));
        let _ = writeln!(out, "  Threats:       {}", swot.threats.join("; "));
    }

    if !report.growth_plan.is_empty() {
        let _ = writeln!(out, "\n30/60/90-Day Growth Plan");
        for (i, step) in report.growth_plan.iter().enumerate() {
            let _ = writeln!(out, "  {}. {}", i + 1, step);
        }
    }

    if !report.sources.is_empty() {
        let _ = writeln!(out, "\nSources ({})", report.sources.len());
        for source in &report.sources {
            let id = source
                .id
                .as_ref()
                .map(value_label)
                .unwrap_or_else(|| "-".to_string());
            let _ = writeln!(out, "  [{}] {}", id, source.url);
        }
    }

    out
}

/// Render the run index, marking the currently loaded run.
pub fn render_runs(entries: &[RunIndexEntry], current: Option<&str>) -> String {
    let mut out = String::new();
    for entry in entries {
        let marker = if current == Some(entry.run_id.as_str()) {
            "*"
        } else {
            " "
        };
        let _ = writeln!(
            out,
            "{} {:<40} {}",
            marker,
            entry.run_id,
            fmt_timestamp(entry.updated_at)
        );
    }
    out
}

/// Render the active configuration.
pub fn render_config(config: &AppConfig) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "endpoint:      {}", config.endpoint);
    let _ = writeln!(out, "run_id_header: {}", config.run_id_header);
    let _ = writeln!(out, "default_mode:  {}", config.default_mode);
    match &config.data_dir {
        Some(dir) => {
            let _ = writeln!(out, "data_dir:      {}", dir.display());
        }
        None => {
            let _ = writeln!(out, "data_dir:      (default)");
        }
    }
    out
}

/// Whole numbers without a fraction, everything else with two decimals.
fn fmt_amount(value: f64) -> String {
    if value.fract().abs() < 1e-9 {
        format!("{:.0}", value)
    } else {
        format!("{:.2}", value)
    }
}

fn fmt_timestamp(millis: i64) -> String {
    DateTime::from_timestamp_millis(millis)
        .map(|ts| ts.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| millis.to_string())
}

fn value_label(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
