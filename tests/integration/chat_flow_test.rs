//! Chat Service Flow Integration Tests
//!
//! Drives full chat turns through `ChatService` with the replay transport
//! and file-backed stores in temporary directories:
//! - Mode decoration of outbound messages and run id adoption
//! - Trigger phrase engaging strict mode and storing the raw report
//! - Transcript, report, index and session surviving a restart
//! - Cancellation markers and retry of the remembered strict request
//!
//! No network access. Every agent response comes from the in-process
//! replay transport.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use reportdeck::{ChatService, RunStore};
use reportdeck_agent::{ReplayTransport, StreamEnd, StreamEvent};
use reportdeck_core::{recover_json, STRICT_REPORT_TRIGGER};

// ============================================================================
// Helpers
// ============================================================================

fn store_at(dir: &tempfile::TempDir) -> RunStore {
    RunStore::new(dir.path().join("data")).expect("store should open")
}

fn replay_chat(store: RunStore) -> ChatService<ReplayTransport> {
    let transport = ReplayTransport::with_chunk_delay(Duration::ZERO);
    ChatService::resume(store, transport, "Quick").expect("chat should resume")
}

/// Collect all events after the turn finished, concatenating text deltas.
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
// Plain chat turns
// ============================================================================

#[tokio::test]
async fn test_plain_turn_decorates_streams_and_persists() {
    let dir = tempfile::tempdir().unwrap();
    let mut chat = replay_chat(store_at(&dir));

    let (tx, rx) = mpsc::channel(256);
    let report = chat
        .send_message("how is churn trending?", None, tx, CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.end, StreamEnd::Completed);
    assert!(!report.report_stored);
    assert_eq!(chat.transcript().len(), 2);
    assert_eq!(
        chat.transcript()[0].content,
        "[Quick mode] how is churn trending?"
    );

    // The streamed deltas concatenate to the persisted assistant message,
    // and a non-strict turn never signals a parsed report.
    let (streamed, parsed) = drain(rx).await;
    assert_eq!(streamed, report.assistant.content);
    assert_eq!(parsed, 0);

    // The fenced JSON in the demo response is visible text, not a report.
    assert!(recover_json(&report.assistant.content).is_some());
    assert!(!report.assistant.has_report_payload);

    let run_id = chat.run().run_id.clone().expect("run id adopted");
    let store = store_at(&dir);
    assert_eq!(store.load_transcript(&run_id).unwrap().len(), 2);
    assert!(store.load_report(&run_id).unwrap().is_none());

    let index = store.load_index().unwrap();
    assert_eq!(index.len(), 1);
    assert_eq!(index[0].run_id, run_id);
}

#[tokio::test]
async fn test_explicit_mode_flag_overrides_default() {
    let dir = tempfile::tempdir().unwrap();
    let mut chat = replay_chat(store_at(&dir));

    let (tx, _rx) = mpsc::channel(256);
    chat.send_message("compare the top competitors", Some("Deep"), tx, CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(
        chat.transcript()[0].content,
        "[Deep mode] compare the top competitors"
    );
}

#[tokio::test]
async fn test_follow_up_turns_share_one_run() {
    let dir = tempfile::tempdir().unwrap();
    let mut chat = replay_chat(store_at(&dir));

    let (tx, _rx) = mpsc::channel(256);
    chat.send_message("first question", None, tx, CancellationToken::new())
        .await
        .unwrap();
    let run_id = chat.run().run_id.clone().unwrap();

    let (tx, _rx) = mpsc::channel(256);
    chat.send_message("second question", None, tx, CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(chat.run().run_id.as_deref(), Some(run_id.as_str()));
    assert_eq!(chat.transcript().len(), 4);

    let store = store_at(&dir);
    assert_eq!(store.load_transcript(&run_id).unwrap().len(), 4);
    assert_eq!(store.load_index().unwrap().len(), 1);
}

// ============================================================================
// Strict report turns
// ============================================================================

#[tokio::test]
async fn test_trigger_phrase_stores_raw_report() {
    let dir = tempfile::tempdir().unwrap();
    let mut chat = replay_chat(store_at(&dir));

    let (tx, rx) = mpsc::channel(256);
    let report = chat
        .send_message(
            "  Generate Full Structured Business Analytics Report  ",
            None,
            tx,
            CancellationToken::new(),
        )
        .await
        .unwrap();

    assert_eq!(report.end, StreamEnd::Completed);
    assert!(report.report_stored);
    assert!(report.assistant.has_report_payload);
    assert_eq!(
        report.assistant.content,
        "Report generated. Open it with the show command."
    );

    // The outbound message is the bare trigger phrase, not decorated.
    assert_eq!(chat.transcript()[0].content, STRICT_REPORT_TRIGGER);

    // A parsed-report signal fires exactly once during the stream.
    let (_, parsed) = drain(rx).await;
    assert_eq!(parsed, 1);

    // The report on disk is the raw payload, keyed as the agent shaped it.
    let run_id = chat.run().run_id.clone().unwrap();
    let stored = store_at(&dir).load_report(&run_id).unwrap().unwrap();
    assert!(stored.get("financial_analysis_if_public").is_some());
    assert!(stored.get("30_60_90_day_growth_plan").is_some());
}

#[tokio::test]
async fn test_session_resumes_after_restart() {
    let dir = tempfile::tempdir().unwrap();

    {
        let mut chat = replay_chat(store_at(&dir));
        let (tx, _rx) = mpsc::channel(256);
        chat.send_message(STRICT_REPORT_TRIGGER, None, tx, CancellationToken::new())
            .await
            .unwrap();
    }

    // A fresh service over the same data directory picks up the same run,
    // its transcript and its stored report.
    let chat = replay_chat(store_at(&dir));
    let run_id = chat.run().run_id.clone().expect("run id restored");
    assert_eq!(chat.transcript().len(), 2);
    assert!(chat.run().last_strict_request.is_some());
    assert!(store_at(&dir).load_report(&run_id).unwrap().is_some());
}

// ============================================================================
// Cancellation and retry
// ============================================================================

#[tokio::test]
async fn test_canceled_strict_turn_is_marked_and_retryable() {
    let dir = tempfile::tempdir().unwrap();
    let mut chat = replay_chat(store_at(&dir));

    let cancel = CancellationToken::new();
    cancel.cancel();

    let (tx, _rx) = mpsc::channel(256);
    let report = chat.request_report(None, tx, cancel).await.unwrap();

    assert_eq!(report.end, StreamEnd::Canceled);
    assert!(!report.report_stored);
    assert!(report.assistant.content.ends_with("_Stream canceled by user._"));
    assert_eq!(
        report.notice.as_deref(),
        Some("Structured report generation was canceled. Retry to request JSON again.")
    );

    // The canceled request was remembered; retrying it completes the run.
    let (tx, _rx) = mpsc::channel(256);
    let retried = chat.retry_report(tx, CancellationToken::new()).await.unwrap();
    assert_eq!(retried.end, StreamEnd::Completed);
    assert!(retried.report_stored);
}

#[tokio::test]
async fn test_canceled_turn_still_lands_in_transcript() {
    let dir = tempfile::tempdir().unwrap();
    let mut chat = replay_chat(store_at(&dir));

    // Establish a run first so the canceled turn has somewhere to persist.
    let (tx, _rx) = mpsc::channel(256);
    chat.send_message("warm up", None, tx, CancellationToken::new())
        .await
        .unwrap();
    let run_id = chat.run().run_id.clone().unwrap();

    let cancel = CancellationToken::new();
    cancel.cancel();
    let (tx, _rx) = mpsc::channel(256);
    chat.send_message("never finishes", None, tx, cancel).await.unwrap();

    let transcript = store_at(&dir).load_transcript(&run_id).unwrap();
    assert_eq!(transcript.len(), 4);
    assert!(transcript[3].content.contains("_Stream canceled by user._"));
}
