//! Output artifact store
//!
//! Processed outputs live on local disk keyed by opaque job id. A real
//! deployment would put these in object storage; the interface is the same
//! either way: a path per job id, resolution that distinguishes "not found",
//! removal, and an age-based sweep.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tracing::warn;
use walkdir::WalkDir;

use crate::error::{NocturneError, Result};

const OUTPUT_EXT: &str = "mp3";

#[derive(Debug, Clone)]
pub struct OutputStore {
    root: PathBuf,
}

impl OutputStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path the artifact for `job_id` is written to.
    pub fn path_for(&self, job_id: &str) -> PathBuf {
        self.root.join(format!("{job_id}.{OUTPUT_EXT}"))
    }

    /// Resolve a stored artifact by job id.
    pub fn resolve(&self, job_id: &str) -> Result<PathBuf> {
        let path = self.path_for(job_id);
        if path.is_file() {
            Ok(path)
        } else {
            Err(NocturneError::JobNotFound {
                job_id: job_id.to_string(),
            })
        }
    }

    /// Remove the artifact for `job_id` if present. Removing an absent
    /// artifact succeeds: callers use this to clear partial outputs after a
    /// failed job.
    pub fn remove(&self, job_id: &str) -> Result<()> {
        match fs::remove_file(self.path_for(job_id)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Delete artifacts older than `max_age`, returning how many were
    /// removed. Unreadable entries are skipped, not fatal.
    pub fn sweep(&self, max_age: Duration) -> Result<usize> {
        let now = SystemTime::now();
        let mut removed = 0;

        for entry in WalkDir::new(&self.root).min_depth(1).max_depth(1) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("sweep: unreadable entry: {e}");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let modified = match entry.metadata().map(|m| m.modified()) {
                Ok(Ok(modified)) => modified,
                _ => continue,
            };
            let age = now.duration_since(modified).unwrap_or_default();
            if age > max_age {
                match fs::remove_file(entry.path()) {
                    Ok(()) => removed += 1,
                    Err(e) => warn!("sweep: failed to remove {}: {e}", entry.path().display()),
                }
            }
        }

        Ok(removed)
    }
}
