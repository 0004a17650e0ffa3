// src/watch/mod.rs

//! File watching and change detection.
//!
//! This module is responsible for:
//! - Resolving path specs into a directory plus a filename predicate.
//! - Hashing files with a per-watcher salt.
//! - Keeping the table of tracked files and their last digest.
//! - Wiring a non-recursive `notify` watcher to the change check, which hands
//!   real content changes to [`crate::dispatch`].

pub mod digest;
pub mod hash;
pub mod patterns;
pub mod scanner;
pub mod table;
pub mod watcher;

pub use digest::{Digester, HashAlgorithm};
pub use hash::{compute_salted_hash, Salt};
pub use patterns::{FilenameMatcher, PathSpec, ResolvedPathSpec};
pub use scanner::{scan, ScanReport};
pub use table::{ChangeOutcome, TrackedFileTable};
pub use watcher::{content_paths, is_content_event, WatchMessage, Watcher};
