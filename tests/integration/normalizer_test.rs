//! Report Normalization Integration Tests
//!
//! Feeds complete, loosely shaped agent payloads through the public
//! normalization pipeline:
//! - A chip-maker style payload using alias spellings and section scores
//! - An automaker style payload with year-keyed statements and segment maps
//! - Chunked strict-mode folding followed by normalization
//! - The revenue override and growth analytics over normalized documents
//!
//! Payload shapes mirror real agent drift: capitalized keys, formatted
//! number strings, evidence pointers, and financial sections that appear
//! under several historical names.

use serde_json::{json, Value};

use reportdeck_core::{
    apply_revenue_override, compute_mom_growth, normalize_report, StrictJsonSession,
};

// ============================================================================
// Payloads
// ============================================================================

fn chipmaker_payload() -> Value {
    json!({
        "executive_summary": {
            "overview": "Dominant accelerated-computing franchise with data center demand outpacing supply."
        },
        "confidence_scores": {
            "section_scores": {"executive_summary": 0.98, "financial_analysis": 0.9}
        },
        "observed_facts": [
            {"fact": "Data center revenue reached $115.2B in FY2025.", "date": "2025-02-26", "evidence": [1]},
            {"fact": "Gross margin held above 70% for the full year.", "evidence": [2]}
        ],
        "inferred_insights": [
            {
                "insight": "Supply agreements lock in accelerator share through FY2027.",
                "confidence": 95,
                "assumptions": ["Foundry capacity lands as contracted"],
                "evidence": [1]
            }
        ],
        "competitive_comparison_table": [
            {"Company": "Helios", "price": "-", "segment": "Accelerators", "AI_leadership": "CUDA-class moat", "evidence": [2]},
            {"Company": "Ridgeline", "price": "-", "segment": "Accelerators", "product_breadth": "CPU+GPU portfolio"}
        ],
        "financial_analysis_if_public": {
            "summary_table": [
                {"fiscal_year": "2025", "revenue_B": 130.5, "gross_margin_pct": 75, "eps": 2.94},
                {"fiscal_year": "2026", "revenue_B": 215.9, "gross_margin_pct": "~73", "eps": "4.10"}
            ],
            "segment_breakdown": [
                {"segment": "Data Center", "FY2025_revenue_B": 115.2},
                {"segment": "Gaming", "FY2025_revenue_B": 11.4}
            ]
        },
        "30_60_90_day_growth_plan": [
            "Qualify two additional memory suppliers",
            "Expand the sovereign AI pipeline",
            "Launch the inference microservices tier"
        ],
        "sources": [
            {"id": 1, "url": "https://example.com/chipmaker/fy2025-10k", "credibility_score": 0.95},
            {"id": 2, "url": "https://example.com/chipmaker/q4-call", "credibility_score": 0.8}
        ]
    })
}

fn automaker_payload() -> Value {
    json!({
        "executive_summary": {
            "summary": "Margins compress while the energy segment scales.",
            "headline": "should lose to summary",
            "confidence": 0.6
        },
        "financial_analysis": {
            "income_statement": {
                "2023": {"Total Revenue": "$96.8B", "Operating Margin": "9.2%", "EPS": "4.30"},
                "2024": {"Total Revenue": "$97.7B", "Operating Margin": "7.2%", "EPS": "4.07"}
            },
            "segment_perf": {
                "Automotive": {"Revenue": "$77.1B"},
                "Energy": {"Revenue": "$10.1B"}
            }
        }
    })
}

// ============================================================================
// Alias-rich payloads normalize end to end
// ============================================================================

#[test]
fn test_chipmaker_payload_normalizes_end_to_end() {
    let document = normalize_report(&chipmaker_payload());

    // Thesis resolves through the `overview` alias; confidence falls back
    // to the section score because the summary carries none of its own.
    assert!(document.executive_summary.thesis.starts_with("Dominant accelerated"));
    assert_eq!(document.executive_summary.confidence, 0.98);

    let fact = &document.observed_facts[0];
    assert_eq!(fact.timestamp.as_deref(), Some("2025-02-26"));
    assert_eq!(fact.sources[0].url, "https://example.com/chipmaker/fy2025-10k");
    assert!(document.observed_facts[1].timestamp.is_none());

    // Percentage-scale confidence lands on [0,1].
    assert_eq!(document.inferred_insights[0].confidence, 0.95);
    assert_eq!(
        document.inferred_insights[0].assumptions,
        vec!["Foundry capacity lands as contracted".to_string()]
    );

    // Capitalized and vendor-specific column names map onto the canonical row.
    let rows = &document.competitive_comparison_table;
    assert_eq!(rows[0].name, "Helios");
    assert_eq!(rows[0].differentiation, "CUDA-class moat");
    assert_eq!(rows[1].differentiation, "CPU+GPU portfolio");
    assert_eq!(rows[0].sources[0].url, "https://example.com/chipmaker/q4-call");

    // The higher fiscal year wins; "~73" coerces to a 0.73 margin.
    let quarter = document.financial_analysis.latest_quarter.unwrap();
    assert_eq!(quarter.quarter, "FY2026");
    assert_eq!(quarter.revenue, 215.9);
    assert_eq!(quarter.ebitda_margin, 0.73);
    assert_eq!(quarter.eps, "4.10");
    // No per-row source, so the first report source fills in.
    assert_eq!(
        quarter.source_url.as_deref(),
        Some("https://example.com/chipmaker/fy2025-10k")
    );

    // With no internal metrics the series derives from the summary table.
    let series = &document.internal_data_analysis.computed_metrics.revenue_timeseries;
    assert_eq!(series.len(), 2);
    assert_eq!(series[0].period, "2025");
    assert_eq!(series[0].value, 130.5);
    assert_eq!(series[1].value, 215.9);

    let breakdown = &document.internal_data_analysis.computed_metrics.segment_breakdown;
    assert_eq!(breakdown.len(), 2);
    assert_eq!(breakdown[0].segment, "Data Center");
    assert_eq!(breakdown[0].value, 115.2);

    assert_eq!(document.growth_plan.len(), 3);
    assert!(document.swot_analysis.is_none());
}

#[test]
fn test_automaker_payload_with_year_keyed_statements() {
    let document = normalize_report(&automaker_payload());

    // `summary` outranks `headline` in the alias order.
    assert_eq!(
        document.executive_summary.thesis,
        "Margins compress while the energy segment scales."
    );
    assert_eq!(document.executive_summary.confidence, 0.6);

    // The latest year of the income statement becomes the latest quarter,
    // with formatted strings coerced to numbers.
    let quarter = document.financial_analysis.latest_quarter.unwrap();
    assert_eq!(quarter.quarter, "FY2024");
    assert_eq!(quarter.revenue, 97.7);
    assert!((quarter.ebitda_margin - 0.072).abs() < 1e-9);
    assert_eq!(quarter.eps, "4.07");

    // Year-keyed rows become an ascending series.
    let series = &document.internal_data_analysis.computed_metrics.revenue_timeseries;
    assert_eq!(series.len(), 2);
    assert_eq!(series[0].period, "2023");
    assert_eq!(series[0].value, 96.8);
    assert_eq!(series[1].period, "2024");
    assert_eq!(series[1].value, 97.7);

    // The segment performance map flattens to named slices.
    let breakdown = &document.internal_data_analysis.computed_metrics.segment_breakdown;
    assert_eq!(breakdown.len(), 2);
    assert_eq!(breakdown[0].segment, "Automotive");
    assert_eq!(breakdown[0].value, 77.1);
    assert_eq!(breakdown[1].segment, "Energy");
    assert_eq!(breakdown[1].value, 10.1);

    // The derived series feeds growth analytics directly.
    let growth = compute_mom_growth(series);
    assert_eq!(growth[1].growth_pct, 0.93);
}

// ============================================================================
// Chunked strict folding into normalization
// ============================================================================

#[test]
fn test_chunked_fold_recovers_then_normalizes() {
    let payload = chipmaker_payload();
    let body = serde_json::to_string(&payload).unwrap();

    let mut session = StrictJsonSession::new();
    for chunk in body
        .chars()
        .collect::<Vec<_>>()
        .chunks(23)
        .map(|chunk| chunk.iter().collect::<String>())
    {
        session.push_chunk(&chunk);
    }

    let recovered = session.finish().unwrap();
    assert_eq!(recovered, payload);

    let document = normalize_report(&recovered);
    assert_eq!(document.executive_summary.confidence, 0.98);
    assert_eq!(
        document.financial_analysis.latest_quarter.unwrap().revenue,
        215.9
    );
}

#[test]
fn test_markdown_wrapped_payload_recovers() {
    let payload = automaker_payload();
    let body = format!(
        "Here is the full report you asked for.\n\n```json\n{}\n```\n\nLet me know what to drill into.",
        serde_json::to_string_pretty(&payload).unwrap()
    );

    let mut session = StrictJsonSession::new();
    for chunk in body
        .chars()
        .collect::<Vec<_>>()
        .chunks(41)
        .map(|chunk| chunk.iter().collect::<String>())
    {
        session.push_chunk(&chunk);
    }

    assert_eq!(session.finish().unwrap(), payload);
}

// ============================================================================
// Analytics over normalized documents
// ============================================================================

#[test]
fn test_revenue_override_rescales_normalized_document() {
    let document = normalize_report(&chipmaker_payload());
    let adjusted = apply_revenue_override(&document, Some(400.0));

    let quarter = adjusted.financial_analysis.latest_quarter.unwrap();
    assert_eq!(quarter.revenue, 400.0);
    // The margin is a ratio; the override leaves it alone.
    assert_eq!(quarter.ebitda_margin, 0.73);

    // The series scales by the same factor, rounded for display.
    let series = &adjusted.internal_data_analysis.computed_metrics.revenue_timeseries;
    assert_eq!(series[0].value, 241.78);
    assert_eq!(series[1].value, 400.0);

    // The source document is untouched.
    assert_eq!(
        document.financial_analysis.latest_quarter.as_ref().unwrap().revenue,
        215.9
    );
}
