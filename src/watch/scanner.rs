// src/watch/scanner.rs

//! Initial scan: resolve path specs, hash every matching file once and work
//! out which directories are worth subscribing to.

use std::path::PathBuf;

use tracing::{debug, error, trace, warn};

use crate::fs::FileSystem;
use crate::watch::digest::HashAlgorithm;
use crate::watch::hash::{compute_salted_hash, Salt};
use crate::watch::patterns::PathSpec;
use crate::watch::table::TrackedFileTable;

/// What a scan produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    /// Number of files hashed and stored in the table.
    pub tracked_files: usize,
    /// Absolute directories that yielded at least one tracked file, in
    /// first-seen order and without duplicates.
    pub watch_dirs: Vec<PathBuf>,
}

/// Walk the immediate entries of each spec's directory and populate `table`.
///
/// Failures are per spec or per file: they are logged and the scan carries on
/// with the rest. Subdirectories are not descended into.
pub fn scan(
    fs: &dyn FileSystem,
    specs: &[PathSpec],
    algorithm: HashAlgorithm,
    salt: &Salt,
    table: &TrackedFileTable,
) -> ScanReport {
    let mut report = ScanReport::default();

    for spec in specs {
        let resolved = match spec.resolve(fs) {
            Ok(r) => r,
            Err(err) => {
                error!(%spec, error = %err, "invalid path spec; skipping");
                continue;
            }
        };

        trace!(dir = ?resolved.dir, matcher = ?resolved.matcher, "walking directory");

        let entries = match fs.read_dir(&resolved.dir) {
            Ok(e) => e,
            Err(err) => {
                warn!(dir = ?resolved.dir, error = %err, "cannot list directory; skipping");
                continue;
            }
        };

        let mut hashed_here = 0usize;
        for entry in entries {
            if !fs.is_file(&entry) {
                continue;
            }
            if !resolved.matches(&entry) {
                trace!(file = ?entry, "file did not match any glob");
                continue;
            }

            let hash = match compute_salted_hash(fs, &entry, algorithm, salt) {
                Ok(h) => h,
                Err(err) => {
                    warn!(file = ?entry, error = %err, "cannot hash file; not tracking it");
                    continue;
                }
            };

            let abs = fs.absolute(&entry).unwrap_or_else(|_| entry.clone());
            table.insert_or_update(abs, hash);
            debug!(file = ?entry, "tracking file");
            hashed_here += 1;
        }

        report.tracked_files += hashed_here;
        if hashed_here > 0 && !report.watch_dirs.contains(&resolved.dir) {
            report.watch_dirs.push(resolved.dir);
        }
    }

    report
}
