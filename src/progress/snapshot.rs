//! Externally observable progress slot
//!
//! Snapshots are JSON documents replaced atomically: the new content is
//! written to a temporary file in the same directory and renamed over the
//! previous one, so a reader sees either the old or the new snapshot.

use crate::progress::ProgressState;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Destination for published progress snapshots
pub trait ProgressSink: Send + Sync {
    /// Replaces the published snapshot with `state`
    fn publish(&self, state: &ProgressState) -> io::Result<()>;
}

/// Progress slot backed by a JSON file
#[derive(Debug, Clone)]
pub struct SnapshotFile {
    path: PathBuf,
}

impl SnapshotFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ProgressSink for SnapshotFile {
    fn publish(&self, state: &ProgressState) -> io::Result<()> {
        let json = serde_json::to_vec(state)?;
        write_atomic(&self.path, &json)
    }
}

/// Writes `content` to `path` through a temporary file and a rename
pub fn write_atomic(path: &Path, content: &[u8]) -> io::Result<()> {
    let parent = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };

    let mut temp_file = NamedTempFile::new_in(parent)?;
    temp_file.write_all(content)?;
    temp_file.flush()?;
    temp_file.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Reads the progress slot at `path`
///
/// A missing, unreadable or corrupt snapshot is not an error for pollers: it
/// reads as the zero state with `default_total` as the total.
pub fn read_snapshot(path: &Path, default_total: usize) -> ProgressState {
    let content = match std::fs::read(path) {
        Ok(content) => content,
        Err(e) => {
            tracing::debug!("No progress snapshot at {}: {}", path.display(), e);
            return ProgressState::zero(default_total);
        }
    };

    match serde_json::from_slice(&content) {
        Ok(state) => state,
        Err(e) => {
            tracing::debug!("Ignoring corrupt progress snapshot {}: {}", path.display(), e);
            ProgressState::zero(default_total)
        }
    }
}
