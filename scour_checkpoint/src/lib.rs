#![warn(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

//! On-disk checkpoint of fully processed conversations.
//!
//! The store holds the set of conversation ids whose cleanup is verified
//! complete. It is read once at startup and rewritten synchronously after each
//! conversation finishes, so an interrupted run loses at most the in-progress
//! conversation — which is safely re-scanned on the next invocation.
//!
//! The file is a plain JSON array of id strings, kept sorted so successive
//! versions diff cleanly. Deleting the file resets all progress.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use scour_core::{Error, Result};
use tracing::{debug, info};

#[derive(Debug)]
pub struct CheckpointStore {
    path: PathBuf,
    done: BTreeSet<String>,
}

impl CheckpointStore {
    /// Load the checkpoint set from `path`.
    ///
    /// A missing file is an empty set (first run). An unreadable or
    /// unparseable file is [`Error::CorruptCheckpoint`]: starting over would
    /// be harmless for the service, but silently discarding the file would
    /// mask real corruption, so the user decides.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        if !path.exists() {
            info!("No checkpoint file at {}, starting fresh", path.display());
            return Ok(Self {
                path,
                done: BTreeSet::new(),
            });
        }

        let content = fs::read_to_string(&path)?;
        let ids: Vec<String> =
            serde_json::from_str(&content).map_err(|e| Error::CorruptCheckpoint {
                path: path.display().to_string(),
                reason: e.to_string(),
            })?;

        let done: BTreeSet<String> = ids.into_iter().collect();
        info!(
            "Loaded checkpoint from {}: {} conversations already complete",
            path.display(),
            done.len()
        );

        Ok(Self { path, done })
    }

    #[must_use]
    pub fn is_complete(&self, id: &str) -> bool {
        self.done.contains(id)
    }

    /// Record `id` as fully processed and persist the whole set before
    /// returning. The caller must not proceed to the next conversation until
    /// this succeeds.
    pub fn mark_complete(&mut self, id: &str) -> Result<()> {
        self.done.insert(id.to_string());
        self.persist()?;
        debug!("Checkpointed {id} ({} total)", self.done.len());
        Ok(())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.done.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.done.is_empty()
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write-to-temp-then-rename: the live file is only ever replaced by a
    /// fully written one, so a crash mid-write can never shrink the persisted
    /// set.
    fn persist(&self) -> Result<()> {
        let ids: Vec<&str> = self.done.iter().map(String::as_str).collect();
        let json = serde_json::to_string_pretty(&ids).map_err(std::io::Error::other)?;

        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = CheckpointStore::load(dir.path().join("checkpoint.json")).unwrap();
        assert!(store.is_empty());
        assert!(!store.is_complete("C1"));
    }

    #[test]
    fn corrupt_file_is_surfaced_not_discarded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("checkpoint.json");
        fs::write(&path, "{not json").unwrap();

        let err = CheckpointStore::load(&path).unwrap_err();
        assert!(matches!(err, Error::CorruptCheckpoint { .. }));
    }

    #[test]
    fn mark_complete_survives_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("checkpoint.json");

        let mut store = CheckpointStore::load(&path).unwrap();
        store.mark_complete("C2").unwrap();
        store.mark_complete("C1").unwrap();
        store.mark_complete("C1").unwrap(); // idempotent

        let reloaded = CheckpointStore::load(&path).unwrap();
        assert_eq!(reloaded.len(), 2);
        assert!(reloaded.is_complete("C1"));
        assert!(reloaded.is_complete("C2"));
        assert!(!reloaded.is_complete("C3"));
    }

    #[test]
    fn file_is_a_sorted_json_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("checkpoint.json");

        let mut store = CheckpointStore::load(&path).unwrap();
        store.mark_complete("C9").unwrap();
        store.mark_complete("C1").unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let ids: Vec<String> = serde_json::from_str(&content).unwrap();
        assert_eq!(ids, vec!["C1".to_string(), "C9".to_string()]);
    }

    #[test]
    fn no_temp_file_left_behind() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("checkpoint.json");

        let mut store = CheckpointStore::load(&path).unwrap();
        store.mark_complete("C1").unwrap();

        assert!(path.exists());
        assert!(!path.with_extension("tmp").exists());
    }
}
