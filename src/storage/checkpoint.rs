//! Append-only checkpoint file of finished domains.
//!
//! One normalized domain per line. The file is read once as a snapshot when a
//! batch starts and appended to as domains finish; appends from concurrent
//! tasks are serialized by an async mutex so lines never interleave.

use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

/// Checkpoint file handle shared by every task of a batch.
#[derive(Debug)]
pub struct CheckpointStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl CheckpointStore {
    /// Creates a handle; the file itself is created on first append.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Location of the checkpoint file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the set of already processed domains.
    ///
    /// A missing file means a fresh run. An unreadable file is logged and
    /// treated the same way: losing resume data only costs repeated work.
    pub async fn load(&self) -> HashSet<String> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => {
                let done: HashSet<String> = content
                    .lines()
                    .map(|line| line.trim().to_ascii_lowercase())
                    .filter(|line| !line.is_empty())
                    .collect();
                debug!(
                    "Loaded {} checkpointed domain(s) from {}",
                    done.len(),
                    self.path.display()
                );
                done
            }
            Err(e) if e.kind() == ErrorKind::NotFound => HashSet::new(),
            Err(e) => {
                warn!(
                    "Failed to read checkpoint file {}: {e}; starting without resume data",
                    self.path.display()
                );
                HashSet::new()
            }
        }
    }

    /// Records `domain` as processed.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the file cannot be opened or written.
    pub async fn append(&self, domain: &str) -> std::io::Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(format!("{domain}\n").as_bytes()).await?;
        file.flush().await
    }

    /// Deletes the checkpoint file. A missing file is not an error.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if an existing file cannot be removed.
    pub async fn clear(&self) -> std::io::Result<()> {
        let _guard = self.write_lock.lock().await;
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }
}
