//! Usage statistics store.
//!
//! Tracks per-request metrics for the sagectl stats command.
//! Uses JSONL for simplicity and robustness. Recording is best-effort:
//! callers log failures and move on, the main request path never depends
//! on it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use crate::action::Action;
use crate::error::SageError;

/// A single completed (or failed) request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsageRecord {
    pub timestamp: DateTime<Utc>,
    pub action: Action,
    pub duration_ms: u64,
    pub success: bool,
}

/// Aggregated usage for display.
#[derive(Debug, Clone, Default)]
pub struct UsageTotals {
    pub total_uses: u64,
    pub successful: u64,
    /// Counts per action, in [`Action::ALL`] order.
    pub per_action: Vec<(Action, u64)>,
    pub average_duration_ms: u64,
}

impl UsageTotals {
    pub fn success_rate(&self) -> f64 {
        if self.total_uses == 0 {
            0.0
        } else {
            self.successful as f64 / self.total_uses as f64
        }
    }

    pub fn count_for(&self, action: Action) -> u64 {
        self.per_action
            .iter()
            .find(|(a, _)| *a == action)
            .map(|(_, n)| *n)
            .unwrap_or(0)
    }
}

/// Usage store backed by a JSONL file.
pub struct UsageStore {
    path: PathBuf,
}

impl UsageStore {
    pub fn new(data_dir: &Path) -> Self {
        Self {
            path: data_dir.join("usage.jsonl"),
        }
    }

    /// Append one record.
    pub fn record(&self, record: &UsageRecord) -> Result<(), SageError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;

        let line = serde_json::to_string(record)?;
        writeln!(file, "{}", line)?;
        file.sync_all()?;

        Ok(())
    }

    /// Read all records, skipping malformed lines for forward compatibility.
    pub fn read_all(&self) -> Result<Vec<UsageRecord>, SageError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&self.path)?;
        let reader = BufReader::new(file);
        let mut records = Vec::new();

        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str(&line) {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::warn!("skipping malformed usage line: {}", e);
                }
            }
        }

        Ok(records)
    }

    /// Aggregate the log into display totals.
    pub fn totals(&self) -> Result<UsageTotals, SageError> {
        let records = self.read_all()?;

        if records.is_empty() {
            return Ok(UsageTotals::default());
        }

        let total = records.len() as u64;
        let successful = records.iter().filter(|r| r.success).count() as u64;
        let avg_duration =
            records.iter().map(|r| r.duration_ms).sum::<u64>() / total;

        let per_action = Action::ALL
            .iter()
            .map(|&action| {
                let count = records.iter().filter(|r| r.action == action).count() as u64;
                (action, count)
            })
            .collect();

        Ok(UsageTotals {
            total_uses: total,
            successful,
            per_action,
            average_duration_ms: avg_duration,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn record(action: Action, duration_ms: u64, success: bool) -> UsageRecord {
        UsageRecord {
            timestamp: Utc::now(),
            action,
            duration_ms,
            success,
        }
    }

    #[test]
    fn test_record_and_read_roundtrip() {
        let dir = tempdir().unwrap();
        let store = UsageStore::new(dir.path());

        store.record(&record(Action::Explain, 1200, true)).unwrap();
        let records = store.read_all().unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].action, Action::Explain);
        assert_eq!(records[0].duration_ms, 1200);
    }

    #[test]
    fn test_totals_per_action() {
        let dir = tempdir().unwrap();
        let store = UsageStore::new(dir.path());

        store.record(&record(Action::Explain, 100, true)).unwrap();
        store.record(&record(Action::Explain, 300, true)).unwrap();
        store.record(&record(Action::Refactor, 200, false)).unwrap();

        let totals = store.totals().unwrap();
        assert_eq!(totals.total_uses, 3);
        assert_eq!(totals.successful, 2);
        assert_eq!(totals.count_for(Action::Explain), 2);
        assert_eq!(totals.count_for(Action::Refactor), 1);
        assert_eq!(totals.count_for(Action::Chat), 0);
        assert_eq!(totals.average_duration_ms, 200);
    }

    #[test]
    fn test_malformed_lines_skipped() {
        let dir = tempdir().unwrap();
        let store = UsageStore::new(dir.path());

        store.record(&record(Action::Chat, 50, true)).unwrap();
        let mut file = OpenOptions::new()
            .append(true)
            .open(dir.path().join("usage.jsonl"))
            .unwrap();
        writeln!(file, "{{ broken").unwrap();

        let totals = store.totals().unwrap();
        assert_eq!(totals.total_uses, 1);
    }

    #[test]
    fn test_empty_store_totals() {
        let dir = tempdir().unwrap();
        let store = UsageStore::new(dir.path());

        let totals = store.totals().unwrap();
        assert_eq!(totals.total_uses, 0);
        assert_eq!(totals.success_rate(), 0.0);
    }
}
