// ABOUTME: Append-oriented store for hospital snapshots backed by a single JSON array document.
// ABOUTME: Writes are atomic (tmp + fsync + rename); reads retry once to tolerate external writers.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use surge_core::HospitalSnapshot;
use thiserror::Error;

/// How long to wait before retrying a read that hit a partially written document.
const TORN_READ_RETRY_DELAY: Duration = Duration::from_millis(25);

/// Errors that can occur during snapshot store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no hospital snapshot recorded yet")]
    NotFound,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A store holding an append-only sequence of hospital snapshots as a single
/// JSON array-of-objects document. Only the last element is consumed by
/// tools; the writer (synthetic generator) runs on an independent cadence.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path to the backing JSON document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the full snapshot sequence. A missing file reads as an empty
    /// sequence. A parse failure is retried once after a short pause; an
    /// external writer overwriting the file in place can briefly expose a
    /// partial document.
    pub fn read_all(&self) -> Result<Vec<HospitalSnapshot>, StoreError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        match self.parse_document() {
            Ok(snapshots) => Ok(snapshots),
            Err(StoreError::Json(first)) => {
                tracing::warn!(error = %first, path = %self.path.display(), "snapshot document failed to parse, retrying read");
                std::thread::sleep(TORN_READ_RETRY_DELAY);
                self.parse_document()
            }
            Err(e) => Err(e),
        }
    }

    /// Read the most recent snapshot. Returns `StoreError::NotFound` when the
    /// document is absent or the array is empty.
    pub fn read_latest(&self) -> Result<HospitalSnapshot, StoreError> {
        self.read_all()?.pop().ok_or(StoreError::NotFound)
    }

    /// Append a snapshot to the document. The whole array is rewritten to a
    /// temp file in the same directory, fsynced, then renamed over the
    /// target, so readers never observe a partial document from this writer.
    /// A document that fails to parse fails the append; the existing file is
    /// never overwritten with a truncated sequence.
    pub fn append(&self, snapshot: &HospitalSnapshot) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let mut snapshots = self.read_all()?;
        snapshots.push(snapshot.clone());

        let json = serde_json::to_string_pretty(&snapshots)?;
        let tmp_path = self.path.with_extension("json.tmp");

        let mut file = File::create(&tmp_path)?;
        file.write_all(json.as_bytes())?;
        file.sync_all()?;
        drop(file);

        fs::rename(&tmp_path, &self.path)?;

        Ok(())
    }

    fn parse_document(&self) -> Result<Vec<HospitalSnapshot>, StoreError> {
        let contents = fs::read_to_string(&self.path)?;
        if contents.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&contents)?)
    }
}
