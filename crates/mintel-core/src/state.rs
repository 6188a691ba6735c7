//! Processing state: which capture-cache meetings already have a note.
//!
//! The ledger only grows. The orchestrator records a meeting after its note is on disk and
//! saves the ledger once per run, so a crash in between means that meeting is processed
//! again on the next run (at-least-once).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{SyncError, SyncResult};
use crate::persist::write_atomic;

/// One processed meeting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedMeeting {
    pub title: String,
    pub processed_at: DateTime<Utc>,
    pub filepath: PathBuf,
}

/// Persisted ledger: `{ processedMeetings: { <id>: {...} }, lastSync }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingState {
    #[serde(default)]
    pub processed_meetings: BTreeMap<String, ProcessedMeeting>,
    #[serde(default)]
    pub last_sync: Option<DateTime<Utc>>,
}

impl ProcessingState {
    /// Load from `path`. Missing or unreadable files yield an empty ledger (logged).
    pub fn load(path: &Path) -> Self {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Self::default(),
            Err(e) => {
                tracing::warn!(
                    target: "mintel::state",
                    path = %path.display(),
                    error = %e,
                    "Could not read state file; starting with an empty ledger"
                );
                return Self::default();
            }
        };
        match serde_json::from_str(&content) {
            Ok(state) => state,
            Err(e) => {
                tracing::warn!(
                    target: "mintel::state",
                    path = %path.display(),
                    error = %e,
                    "Could not parse state file; starting with an empty ledger"
                );
                Self::default()
            }
        }
    }

    /// Stamp `last_sync` and write the ledger.
    pub fn save(&mut self, path: &Path, now: DateTime<Utc>) -> SyncResult<()> {
        self.last_sync = Some(now);
        let json = serde_json::to_vec_pretty(self)?;
        write_atomic(path, &json).map_err(|source| SyncError::StateWrite {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn contains(&self, meeting_id: &str) -> bool {
        self.processed_meetings.contains_key(meeting_id)
    }

    pub fn record(&mut self, meeting_id: impl Into<String>, entry: ProcessedMeeting) {
        self.processed_meetings.insert(meeting_id.into(), entry);
    }

    pub fn len(&self) -> usize {
        self.processed_meetings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processed_meetings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn missing_file_is_empty_state() {
        let dir = tempfile::tempdir().unwrap();
        let state = ProcessingState::load(&dir.path().join("nope.json"));
        assert!(state.is_empty());
        assert!(state.last_sync.is_none());
    }

    #[test]
    fn corrupt_file_is_empty_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(ProcessingState::load(&path).is_empty());
    }

    #[test]
    fn save_stamps_last_sync_and_uses_camel_case() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("System/state.json");
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 9, 30, 0).unwrap();
        let mut state = ProcessingState::default();
        state.record(
            "doc-1",
            ProcessedMeeting {
                title: "Acme sync".into(),
                processed_at: now,
                filepath: PathBuf::from("/vault/Inbox/Meetings/2026-10-19/acme-sync.md"),
            },
        );
        state.save(&path, now).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert!(raw["processedMeetings"]["doc-1"]["processedAt"].is_string());
        assert!(raw["lastSync"].is_string());

        let reloaded = ProcessingState::load(&path);
        assert_eq!(reloaded.last_sync, Some(now));
        assert!(reloaded.contains("doc-1"));
    }
}
