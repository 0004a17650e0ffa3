// src/fs/mod.rs

//! Filesystem access behind a trait so hashing, path resolution and scanning
//! can run against [`mock::MockFileSystem`] in tests.

use std::fmt::Debug;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

pub mod mock;

/// Abstract filesystem interface.
///
/// Errors are plain `io::Error`s so callers can wrap them into the precise
/// [`ReloadwatchError`](crate::errors::ReloadwatchError) variant they need.
pub trait FileSystem: Send + Sync + Debug {
    fn open_read(&self, path: &Path) -> io::Result<Box<dyn Read + Send>>;
    fn is_file(&self, path: &Path) -> bool;

    /// Make `path` absolute without resolving symlinks.
    fn absolute(&self, path: &Path) -> io::Result<PathBuf>;

    /// Return the entries of a directory (non-recursive), as full paths.
    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>>;
}

/// Implementation that uses `std::fs`.
#[derive(Debug, Clone, Default)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn open_read(&self, path: &Path) -> io::Result<Box<dyn Read + Send>> {
        let file = fs::File::open(path)?;
        Ok(Box::new(file))
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn absolute(&self, path: &Path) -> io::Result<PathBuf> {
        std::path::absolute(path)
    }

    fn read_dir(&self, path: &Path) -> io::Result<Vec<PathBuf>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(path)? {
            let entry = entry?;
            entries.push(entry.path());
        }
        entries.sort();
        Ok(entries)
    }
}
