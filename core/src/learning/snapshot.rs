//! learning/snapshot.rs
//! JSON persistence of the learner history.
//!
//! Only the history is stored. The model is rebuilt on load from the prefix
//! up to the last retrain boundary, which is what a live process would hold.
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::constants::HISTORY_SNAPSHOT_VERSION;
use crate::learning::history::HistoryEntry;
use crate::learning::learner::OutcomeLearner;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("unsupported snapshot format version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistorySnapshot {
    pub format_version: u32,
    pub saved_at: DateTime<Utc>,
    pub entries: Vec<HistoryEntry>,
}

impl HistorySnapshot {
    pub fn new(entries: Vec<HistoryEntry>) -> Self {
        Self { format_version: HISTORY_SNAPSHOT_VERSION, saved_at: Utc::now(), entries }
    }

    /// Write to `path` through a sibling temp file so a crash never leaves a
    /// truncated snapshot behind.
    pub fn write_to(&self, path: &Path) -> Result<(), SnapshotError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let tmp = temp_path(path);
        {
            let mut w = BufWriter::new(File::create(&tmp)?);
            serde_json::to_writer(&mut w, self)?;
            w.flush()?;
        }
        fs::rename(&tmp, path)?;
        Ok(())
    }

    pub fn read_from(path: &Path) -> Result<Self, SnapshotError> {
        let snapshot: Self = serde_json::from_reader(BufReader::new(File::open(path)?))?;
        if snapshot.format_version != HISTORY_SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion {
                found: snapshot.format_version,
                expected: HISTORY_SNAPSHOT_VERSION,
            });
        }
        Ok(snapshot)
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

impl OutcomeLearner {
    pub fn save_snapshot(&self, path: impl AsRef<Path>) -> Result<usize, SnapshotError> {
        let snapshot = HistorySnapshot::new(self.history());
        snapshot.write_to(path.as_ref())?;
        info!(entries = snapshot.entries.len(), path = %path.as_ref().display(), "learner history saved");
        Ok(snapshot.entries.len())
    }

    pub fn load_snapshot(&self, path: impl AsRef<Path>) -> Result<usize, SnapshotError> {
        let snapshot = HistorySnapshot::read_from(path.as_ref())?;
        let n = snapshot.entries.len();
        self.restore(snapshot.entries);
        info!(entries = n, path = %path.as_ref().display(), "learner history restored");
        Ok(n)
    }
}
