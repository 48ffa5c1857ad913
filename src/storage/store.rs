//! Run Persistence
//!
//! File-backed storage for everything a run leaves behind: the chat
//! transcript, the raw structured report exactly as the agent produced
//! it, the recency-ordered run index, and the session pointer that lets
//! the next invocation resume the same run. Reports are stored raw and
//! normalized only when displayed or exported.

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use reportdeck_agent::Run;

use crate::models::message::ChatMessage;
use crate::models::run::{upsert_run_index, RunIndexEntry};
use crate::utils::error::AppResult;
use crate::utils::paths::ensure_dir;

/// Session state persisted between invocations
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionSnapshot {
    /// The run the next command operates on, if any
    pub current_run: Option<Run>,
}

/// File-backed store for transcripts, reports, the run index and the
/// session pointer
#[derive(Debug)]
pub struct RunStore {
    base: PathBuf,
}

impl RunStore {
    /// Open a store rooted at the given data directory, creating the
    /// layout on first use
    pub fn new(base: impl Into<PathBuf>) -> AppResult<Self> {
        let base = base.into();
        ensure_dir(&base)?;
        ensure_dir(&base.join("transcripts"))?;
        ensure_dir(&base.join("reports"))?;
        Ok(Self { base })
    }

    fn transcript_path(&self, run_id: &str) -> PathBuf {
        self.base
            .join("transcripts")
            .join(format!("{}.json", sanitize_run_id(run_id)))
    }

    fn report_path(&self, run_id: &str) -> PathBuf {
        self.base
            .join("reports")
            .join(format!("{}.json", sanitize_run_id(run_id)))
    }

    fn index_path(&self) -> PathBuf {
        self.base.join("run_index.json")
    }

    fn session_path(&self) -> PathBuf {
        self.base.join("session.json")
    }

    /// Load the transcript for a run. A run with no saved transcript is
    /// an empty transcript.
    pub fn load_transcript(&self, run_id: &str) -> AppResult<Vec<ChatMessage>> {
        Ok(read_json(&self.transcript_path(run_id))?.unwrap_or_default())
    }

    /// Persist the full transcript for a run
    pub fn save_transcript(&self, run_id: &str, messages: &[ChatMessage]) -> AppResult<()> {
        write_json(&self.transcript_path(run_id), &messages)
    }

    /// Load the raw stored report for a run, if one was ever parsed
    pub fn load_report(&self, run_id: &str) -> AppResult<Option<Value>> {
        read_json(&self.report_path(run_id))
    }

    /// Persist the raw report for a run, replacing any previous one
    pub fn save_report(&self, run_id: &str, report: &Value) -> AppResult<()> {
        write_json(&self.report_path(run_id), report)
    }

    /// Load the run index, most recently active first
    pub fn load_index(&self) -> AppResult<Vec<RunIndexEntry>> {
        Ok(read_json(&self.index_path())?.unwrap_or_default())
    }

    /// Record activity on a run, inserting it into the index if new
    pub fn touch_run(&self, run_id: &str) -> AppResult<()> {
        let mut entries = self.load_index()?;
        upsert_run_index(&mut entries, run_id, chrono::Utc::now().timestamp_millis());
        write_json(&self.index_path(), &entries)
    }

    /// Load the persisted session pointer
    pub fn load_session(&self) -> AppResult<SessionSnapshot> {
        Ok(read_json(&self.session_path())?.unwrap_or_default())
    }

    /// Persist the session pointer
    pub fn save_session(&self, snapshot: &SessionSnapshot) -> AppResult<()> {
        write_json(&self.session_path(), snapshot)
    }

    /// Drop the current run pointer. The run index and all stored runs
    /// are kept so the run can be loaded again later.
    pub fn clear_current_run(&self) -> AppResult<()> {
        self.save_session(&SessionSnapshot::default())
    }
}

/// Run ids come from a response header; keep file names to a safe
/// character set.
fn sanitize_run_id(run_id: &str) -> String {
    run_id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

fn read_json<T: DeserializeOwned>(path: &Path) -> AppResult<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    Ok(Some(serde_json::from_str(&content)?))
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> AppResult<()> {
    let content = serde_json::to_string_pretty(value)?;
    fs::write(path, content)?;
    Ok(())
}
