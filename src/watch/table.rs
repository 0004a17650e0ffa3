// src/watch/table.rs

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use crate::errors::Result;

/// Result of [`TrackedFileTable::compare_and_update`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeOutcome {
    /// Path is not tracked; nothing was computed or stored.
    Untracked,
    /// Fresh digest equals the stored one.
    Unchanged,
    /// Stored digest was replaced.
    Changed { previous: String, current: String },
}

/// Absolute path -> last observed digest, for a single watcher.
///
/// Entries are only ever added or overwritten, never removed. Every operation
/// takes the internal lock; the map itself is never handed out.
#[derive(Debug, Default)]
pub struct TrackedFileTable {
    hashes: Mutex<HashMap<PathBuf, String>>,
}

impl TrackedFileTable {
    pub fn new() -> Self {
        Self::default()
    }

    // The map holds plain strings, so a panic in another holder cannot leave
    // it half-updated; recover from poisoning instead of propagating it.
    fn lock(&self) -> MutexGuard<'_, HashMap<PathBuf, String>> {
        self.hashes
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Cheap pre-check used before hashing.
    ///
    /// Because entries are never removed, `true` stays true. A concurrent
    /// insert may be missed, which only defers detection to the next event.
    pub fn contains(&self, path: &Path) -> bool {
        self.lock().contains_key(path)
    }

    pub fn get(&self, path: &Path) -> Option<String> {
        self.lock().get(path).cloned()
    }

    pub fn insert_or_update(&self, path: impl Into<PathBuf>, digest: impl Into<String>) {
        self.lock().insert(path.into(), digest.into());
    }

    /// Recompute and compare a tracked path's digest in one critical section.
    ///
    /// `compute` runs while the lock is held, so two concurrent checks of the
    /// same file cannot both observe the old digest. If `compute` fails the
    /// table is left untouched and the error is returned.
    pub fn compare_and_update<F>(&self, path: &Path, compute: F) -> Result<ChangeOutcome>
    where
        F: FnOnce() -> Result<String>,
    {
        let mut hashes = self.lock();
        let Some(previous) = hashes.get(path) else {
            return Ok(ChangeOutcome::Untracked);
        };

        let current = compute()?;
        if *previous == current {
            return Ok(ChangeOutcome::Unchanged);
        }

        let previous = previous.clone();
        hashes.insert(path.to_path_buf(), current.clone());
        Ok(ChangeOutcome::Changed { previous, current })
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Sorted snapshot of the tracked paths.
    pub fn paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self.lock().keys().cloned().collect();
        paths.sort();
        paths
    }
}
