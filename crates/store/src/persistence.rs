//! JSON snapshot persistence.
//!
//! The store hands a full [`Snapshot`] to a [`PersistHandle`] after every
//! mutation and moves on. A background task started by
//! [`SnapshotWriter::spawn`] writes the newest queued snapshot to disk.
//! Write failures are logged, never returned to the caller.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use slate_core::project::ProjectSettings;
use slate_core::take::TakeRecord;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::{StoreError, StoreResult};

/// Current on-disk format version.
pub const SNAPSHOT_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Everything the store holds, as written to disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub version: u32,
    #[serde(default)]
    pub projects: Vec<ProjectSettings>,
    #[serde(default)]
    pub takes: Vec<TakeRecord>,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            projects: Vec::new(),
            takes: Vec::new(),
        }
    }
}

/// Read a snapshot from `path`. A missing file yields an empty snapshot.
pub async fn load_snapshot(path: &Path) -> StoreResult<Snapshot> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!(path = %path.display(), "No data file yet, starting empty");
            return Ok(Snapshot::default());
        }
        Err(e) => return Err(e.into()),
    };

    let snapshot: Snapshot = serde_json::from_slice(&bytes)?;
    if snapshot.version != SNAPSHOT_VERSION {
        return Err(StoreError::UnsupportedVersion {
            found: snapshot.version,
            expected: SNAPSHOT_VERSION,
        });
    }
    Ok(snapshot)
}

/// Write `snapshot` to `path` via a sibling temp file and rename, so a
/// crash mid-write never leaves a truncated data file.
pub async fn save_snapshot(path: &Path, snapshot: &Snapshot) -> StoreResult<()> {
    let json = serde_json::to_vec_pretty(snapshot)?;
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    tokio::fs::write(&tmp, &json).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Writer task
// ---------------------------------------------------------------------------

/// Sending half given to the store. Cloning is cheap.
#[derive(Debug, Clone)]
pub struct PersistHandle {
    sender: mpsc::UnboundedSender<Snapshot>,
}

impl PersistHandle {
    /// Queue `snapshot` for writing. Never blocks and never waits for the write.
    pub fn submit(&self, snapshot: Snapshot) {
        if self.sender.send(snapshot).is_err() {
            tracing::warn!("Snapshot writer has stopped, snapshot dropped");
        }
    }
}

/// Background task that persists snapshots to a single file.
pub struct SnapshotWriter;

impl SnapshotWriter {
    /// Start the writer on the current tokio runtime.
    ///
    /// The task exits once every [`PersistHandle`] is dropped and the queue
    /// is drained; await the returned handle to be sure the last snapshot
    /// reached disk.
    pub fn spawn(path: PathBuf) -> (PersistHandle, JoinHandle<()>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let task = tokio::spawn(Self::run(path, receiver));
        (PersistHandle { sender }, task)
    }

    async fn run(path: PathBuf, mut receiver: mpsc::UnboundedReceiver<Snapshot>) {
        while let Some(mut snapshot) = receiver.recv().await {
            // Only the newest queued state needs to reach disk.
            while let Ok(newer) = receiver.try_recv() {
                snapshot = newer;
            }
            match save_snapshot(&path, &snapshot).await {
                Ok(()) => tracing::debug!(
                    path = %path.display(),
                    takes = snapshot.takes.len(),
                    "Snapshot written"
                ),
                Err(e) => tracing::error!(
                    error = %e,
                    path = %path.display(),
                    "Failed to persist snapshot"
                ),
            }
        }
        tracing::debug!("Snapshot channel closed, writer shutting down");
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
