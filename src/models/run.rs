//! Run Index Models
//!
//! Data structures for the list of known runs, ordered by recency.

use serde::{Deserialize, Serialize};

/// One entry in the persisted run index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunIndexEntry {
    /// Run identifier assigned by the agent endpoint
    pub run_id: String,
    /// Last activity, unix milliseconds
    pub updated_at: i64,
}

/// Insert or refresh a run in the index, keeping the most recently
/// active run first.
pub fn upsert_run_index(entries: &mut Vec<RunIndexEntry>, run_id: &str, updated_at: i64) {
    if let Some(entry) = entries.iter_mut().find(|entry| entry.run_id == run_id) {
        entry.updated_at = updated_at;
    } else {
        entries.push(RunIndexEntry {
            run_id: run_id.to_string(),
            updated_at,
        });
    }
    entries.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
}
