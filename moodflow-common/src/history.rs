//! On-disk session history
//!
//! History is an ordered sequence of `{mood, genre, timestamp}` records
//! serialized as a single JSON array, rewritten in full on each append.
//! Records are never mutated or removed. Intended for single-user local
//! use; there is no cross-process guard on the file.

use crate::model::{HistorySession, Mood};
use crate::Result;
use chrono::Utc;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;

/// Number of sessions the UI shows
pub const DISPLAY_LIMIT: usize = 5;

/// Whole-file JSON-array history store
#[derive(Debug)]
pub struct HistoryStore {
    path: PathBuf,
    /// Serializes concurrent appends within this process; the file itself
    /// carries no cross-process guard (single-user/local usage)
    append_lock: Mutex<()>,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            append_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the full history, oldest first.
    ///
    /// A missing file is an empty history. An unreadable or corrupt file is
    /// treated the same way the original data would be on first run: empty,
    /// with a warning, so one bad write never bricks the app.
    pub fn read_all(&self) -> Vec<HistorySession> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to read history file");
                return Vec::new();
            }
        };

        match serde_json::from_str(&content) {
            Ok(sessions) => sessions,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Corrupt history file, starting fresh");
                Vec::new()
            }
        }
    }

    /// Append one session, stamping it with the current UTC time, and
    /// rewrite the whole file. Returns the stored record.
    pub fn append(&self, mood: Mood, genre: impl Into<String>) -> Result<HistorySession> {
        let _guard = self
            .append_lock
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let session = HistorySession {
            mood,
            genre: genre.into(),
            timestamp: Utc::now(),
        };

        let mut sessions = self.read_all();
        sessions.push(session.clone());

        let json = serde_json::to_string_pretty(&sessions)?;
        std::fs::write(&self.path, json)?;

        Ok(session)
    }

    /// The display window: most recent sessions first, capped at
    /// [`DISPLAY_LIMIT`]. Truncation applies to display only; the file
    /// keeps everything.
    pub fn recent(&self) -> Vec<HistorySession> {
        let mut sessions = self.read_all();
        sessions.reverse();
        sessions.truncate(DISPLAY_LIMIT);
        sessions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Mood;

    fn temp_store() -> (tempfile::TempDir, HistoryStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = HistoryStore::new(dir.path().join("history").join("sessions.json"));
        (dir, store)
    }

    #[test]
    fn missing_file_reads_empty() {
        let (_dir, store) = temp_store();
        assert!(store.read_all().is_empty());
        assert!(store.recent().is_empty());
    }

    #[test]
    fn append_preserves_insertion_order() {
        let (_dir, store) = temp_store();
        store.append(Mood::Happy, "pop").unwrap();
        store.append(Mood::Sad, "ambient").unwrap();
        store.append(Mood::Calm, "chill").unwrap();

        let all = store.read_all();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].genre, "pop");
        assert_eq!(all[2].genre, "chill");
        assert_eq!(all[0].mood, Mood::Happy);
    }

    #[test]
    fn recent_is_most_recent_first_and_capped() {
        let (_dir, store) = temp_store();
        for i in 0..7 {
            store.append(Mood::Neutral, format!("genre-{i}")).unwrap();
        }

        let recent = store.recent();
        assert_eq!(recent.len(), DISPLAY_LIMIT);
        assert_eq!(recent[0].genre, "genre-6");
        assert_eq!(recent[4].genre, "genre-2");

        // full file still has everything
        assert_eq!(store.read_all().len(), 7);
    }

    #[test]
    fn corrupt_file_reads_empty_and_recovers_on_append() {
        let (_dir, store) = temp_store();
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        std::fs::write(store.path(), "{ not json").unwrap();

        assert!(store.read_all().is_empty());

        store.append(Mood::Energetic, "rock").unwrap();
        let all = store.read_all();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].genre, "rock");
    }

    #[test]
    fn file_is_a_json_array_on_disk() {
        let (_dir, store) = temp_store();
        store.append(Mood::Happy, "pop").unwrap();
        let raw = std::fs::read_to_string(store.path()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert!(value.is_array());
    }
}
