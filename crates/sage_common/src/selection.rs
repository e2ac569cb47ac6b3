//! Last-selection store.
//!
//! A single-slot, file-backed record of the most recent selection the user
//! routed to codesage, so a follow-up command can pick it up without
//! re-pasting. A slot is usable only while fresh (under five seconds old)
//! and is consumed on read.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::action::Action;
use crate::error::SageError;

/// A stored selection older than this is treated as absent.
pub const SELECTION_MAX_AGE_MS: i64 = 5000;

/// One recorded selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredSelection {
    pub text: String,
    /// Action to auto-run on resume, when one was chosen at record time.
    pub action: Option<Action>,
    /// Epoch milliseconds at record time.
    pub stored_at_ms: i64,
}

impl StoredSelection {
    pub fn age_ms(&self, now_ms: i64) -> i64 {
        now_ms - self.stored_at_ms
    }

    /// Usable iff strictly younger than [`SELECTION_MAX_AGE_MS`].
    pub fn is_fresh(&self, now_ms: i64) -> bool {
        self.age_ms(now_ms) < SELECTION_MAX_AGE_MS
    }
}

/// Single-slot selection store under the data directory.
pub struct SelectionStore {
    path: PathBuf,
}

impl SelectionStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join("selection.json"),
        }
    }

    /// Overwrite the slot with a new selection, stamped now.
    pub fn record(&self, text: &str, action: Option<Action>) -> Result<(), SageError> {
        let selection = StoredSelection {
            text: text.to_string(),
            action,
            stored_at_ms: now_ms(),
        };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string(&selection)?)?;
        Ok(())
    }

    /// Take the stored selection if it is still fresh.
    ///
    /// The slot is cleared either way: a selection is meant for exactly one
    /// follow-up command.
    pub fn take(&self) -> Result<Option<StoredSelection>, SageError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&self.path)?;
        fs::remove_file(&self.path)?;

        let selection: StoredSelection = match serde_json::from_str(&contents) {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!("discarding unreadable selection slot: {}", e);
                return Ok(None);
            }
        };

        if selection.is_fresh(now_ms()) {
            Ok(Some(selection))
        } else {
            Ok(None)
        }
    }
}

fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn selection_at(age_ms: i64, now_ms: i64) -> StoredSelection {
        StoredSelection {
            text: "let x = 1;".to_string(),
            action: Some(Action::Explain),
            stored_at_ms: now_ms - age_ms,
        }
    }

    #[test]
    fn test_freshness_boundary() {
        let now = 1_700_000_000_000;
        assert!(selection_at(0, now).is_fresh(now));
        assert!(selection_at(4999, now).is_fresh(now));
        assert!(!selection_at(5000, now).is_fresh(now));
        assert!(!selection_at(5001, now).is_fresh(now));
    }

    #[test]
    fn test_record_then_take() {
        let dir = tempdir().unwrap();
        let store = SelectionStore::new(dir.path());

        store.record("fn main() {}", Some(Action::Review)).unwrap();
        let taken = store.take().unwrap().expect("fresh selection");
        assert_eq!(taken.text, "fn main() {}");
        assert_eq!(taken.action, Some(Action::Review));
    }

    #[test]
    fn test_slot_consumed_on_read() {
        let dir = tempdir().unwrap();
        let store = SelectionStore::new(dir.path());

        store.record("x", None).unwrap();
        assert!(store.take().unwrap().is_some());
        assert!(store.take().unwrap().is_none());
    }

    #[test]
    fn test_stale_slot_treated_as_absent() {
        let dir = tempdir().unwrap();
        let store = SelectionStore::new(dir.path());

        let stale = StoredSelection {
            text: "old".to_string(),
            action: None,
            stored_at_ms: now_ms() - SELECTION_MAX_AGE_MS - 1,
        };
        std::fs::write(
            dir.path().join("selection.json"),
            serde_json::to_string(&stale).unwrap(),
        )
        .unwrap();

        assert!(store.take().unwrap().is_none());
        // Stale slot is still cleared.
        assert!(!dir.path().join("selection.json").exists());
    }

    #[test]
    fn test_malformed_slot_discarded() {
        let dir = tempdir().unwrap();
        let store = SelectionStore::new(dir.path());

        std::fs::write(dir.path().join("selection.json"), "not json").unwrap();
        assert!(store.take().unwrap().is_none());
    }

    #[test]
    fn test_missing_slot_is_none() {
        let dir = tempdir().unwrap();
        let store = SelectionStore::new(dir.path());
        assert!(store.take().unwrap().is_none());
    }
}
