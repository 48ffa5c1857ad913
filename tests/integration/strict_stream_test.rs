//! Strict Structured-Report Stream Integration Tests
//!
//! Runs the strict JSON pipeline end to end over the replay transport:
//! - The trigger phrase replays a raw report recovered mid-stream
//! - The recovered document matches the replayed fixture exactly
//! - Normalizing the recovered document yields display-ready values
//! - Non-strict streams never surface a report even when JSON is present
//! - Cancellation mid-stream keeps partial text and drops the report

use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use reportdeck_agent::{ReplayTransport, RunSession, StreamEnd, StreamEvent};
use reportdeck_core::{compute_mom_growth, normalize_report, recover_json, STRICT_REPORT_TRIGGER};

const STRICT_FIXTURE: &str = include_str!("../../crates/agent/fixtures/strict_report.json");

// ============================================================================
// Helpers
// ============================================================================

fn session() -> RunSession<ReplayTransport> {
    RunSession::new(ReplayTransport::with_chunk_delay(Duration::ZERO))
}

async fn drain(mut rx: mpsc::Receiver<StreamEvent>) -> (String, usize) {
    let mut text = String::new();
    let mut parsed = 0;
    while let Some(event) = rx.recv().await {
        match event {
            StreamEvent::TextDelta { content } => text.push_str(&content),
            StreamEvent::ReportParsed => parsed += 1,
        }
    }
    (text, parsed)
}

// ============================================================================
// Strict recovery against the replayed fixture
// ============================================================================

#[tokio::test]
async fn test_trigger_stream_recovers_fixture_verbatim() {
    let mut session = session();

    let (tx, rx) = mpsc::channel(256);
    let outcome = session
        .send(STRICT_REPORT_TRIGGER, true, tx, CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(outcome.end, StreamEnd::Completed);
    assert_eq!(outcome.text, STRICT_FIXTURE);
    assert_eq!(
        outcome.report,
        Some(serde_json::from_str(STRICT_FIXTURE).unwrap())
    );
    assert!(session.run().run_id.is_some());

    // Deltas reassemble the full body; the parsed signal fires once.
    let (streamed, parsed) = drain(rx).await;
    assert_eq!(streamed, STRICT_FIXTURE);
    assert_eq!(parsed, 1);
}

#[tokio::test]
async fn test_recovered_report_normalizes_for_display() {
    let mut session = session();

    let (tx, _rx) = mpsc::channel(256);
    let outcome = session
        .send(STRICT_REPORT_TRIGGER, true, tx, CancellationToken::new())
        .await
        .unwrap();

    let document = normalize_report(&outcome.report.unwrap());

    assert!(document.executive_summary.thesis.starts_with("Atlas Metrics"));
    assert_eq!(document.executive_summary.confidence, 0.84);

    // Evidence pointers resolve against the run-scoped source list.
    assert_eq!(document.observed_facts.len(), 3);
    assert_eq!(document.observed_facts[0].timestamp.as_deref(), Some("2025-11-04"));
    assert_eq!(
        document.observed_facts[0].sources[0].url,
        "https://example.com/atlas/fy2025-10k"
    );
    assert!(document.observed_facts[2].timestamp.is_none());

    assert_eq!(document.inferred_insights[0].confidence, 0.72);
    assert_eq!(document.inferred_insights[0].assumptions.len(), 1);
    assert_eq!(document.inferred_insights[0].sources.len(), 2);

    assert_eq!(document.competitive_comparison_table.len(), 3);
    assert_eq!(document.competitive_comparison_table[0].name, "Atlas Metrics");
    assert_eq!(
        document.competitive_comparison_table[0].price,
        "$0.0008 per event"
    );

    // The latest fiscal year wins the summary table.
    let quarter = document.financial_analysis.latest_quarter.unwrap();
    assert_eq!(quarter.quarter, "FY2025");
    assert_eq!(quarter.revenue, 412.0);
    assert_eq!(quarter.ebitda_margin, 0.16);
    assert_eq!(quarter.eps, "0.71");
    assert_eq!(
        quarter.source_url.as_deref(),
        Some("https://example.com/atlas/fy2025")
    );

    // Internal computed metrics take precedence over derived series.
    let series = &document.internal_data_analysis.computed_metrics.revenue_timeseries;
    assert_eq!(series.len(), 4);
    assert_eq!(series[0].period, "FY2022");
    assert_eq!(series[3].value, 412.0);

    let breakdown = &document.internal_data_analysis.computed_metrics.segment_breakdown;
    assert_eq!(breakdown.len(), 3);
    assert_eq!(breakdown[0].segment, "Platform subscriptions");

    assert_eq!(document.swot_analysis.unwrap().strengths.len(), 2);
    assert_eq!(document.growth_plan.len(), 3);
    assert!(document.growth_plan[0].starts_with("Days 1-30"));
    assert_eq!(document.sources.len(), 3);

    // Growth rates derive straight off the normalized series.
    let growth = compute_mom_growth(series);
    assert_eq!(growth[0].growth_pct, 0.0);
    assert_eq!(growth[1].growth_pct, 45.2);
}

// ============================================================================
// Non-strict streams
// ============================================================================

#[tokio::test]
async fn test_plain_stream_never_surfaces_a_report() {
    let mut session = session();

    let (tx, _rx) = mpsc::channel(256);
    let outcome = session
        .send("walk me through a saas example", false, tx, CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(outcome.end, StreamEnd::Completed);
    assert!(outcome.report.is_none());

    // The JSON is right there in the fenced block, but only strict mode
    // promotes it to a report.
    assert!(recover_json(&outcome.text).is_some());
}

#[tokio::test]
async fn test_run_id_survives_follow_up_sends() {
    let mut session = session();

    let (tx, _rx) = mpsc::channel(256);
    session
        .send("first", false, tx, CancellationToken::new())
        .await
        .unwrap();
    let run_id = session.run().run_id.clone().unwrap();

    // The follow-up goes through continue_run, which advertises no id;
    // the adopted one sticks.
    let (tx, _rx) = mpsc::channel(256);
    session
        .send("second", false, tx, CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(session.run().run_id.as_deref(), Some(run_id.as_str()));
}

// ============================================================================
// Cancellation
// ============================================================================

#[tokio::test]
async fn test_cancel_mid_stream_keeps_partial_fixture_text() {
    let transport = ReplayTransport::with_chunk_delay(Duration::from_millis(20));
    let mut session = RunSession::new(transport);

    let cancel = CancellationToken::new();
    let canceler = cancel.clone();
    let (tx, mut rx) = mpsc::channel(256);

    let handle = tokio::spawn(async move {
        let outcome = session.send(STRICT_REPORT_TRIGGER, true, tx, cancel).await;
        (outcome, session)
    });

    // Cancel as soon as the first paced chunk lands.
    let first = rx.recv().await.expect("first delta");
    assert!(matches!(first, StreamEvent::TextDelta { .. }));
    canceler.cancel();

    let (outcome, session) = handle.await.unwrap();
    let outcome = outcome.unwrap();

    assert_eq!(outcome.end, StreamEnd::Canceled);
    assert!(outcome.report.is_none());
    assert!(!outcome.text.is_empty());
    assert!(outcome.text.len() < STRICT_FIXTURE.len());

    // The run survives the canceled stream for a later retry.
    assert!(session.run().run_id.is_some());
    assert!(!session.run().is_streaming());
}
