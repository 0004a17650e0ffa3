// src/watch/patterns.rs

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::Deserialize;

use crate::errors::{ReloadwatchError, Result};
use crate::fs::FileSystem;

/// One entry of a watcher's `paths = [...]` list.
///
/// Either an explicit file:
///
/// ```toml
/// paths = [{ file = "/etc/nginx/nginx.conf" }]
/// ```
///
/// or a directory with optional filename globs:
///
/// ```toml
/// paths = [{ dir = "/etc/app", globs = ["*.conf", "*.yml"] }]
/// ```
///
/// `file` wins when both are given. Directories are never descended into.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PathSpec {
    #[serde(default)]
    pub dir: Option<PathBuf>,
    #[serde(default)]
    pub globs: Vec<String>,
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl PathSpec {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            file: Some(path.into()),
            ..Self::default()
        }
    }

    pub fn dir<I, S>(dir: impl Into<PathBuf>, globs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            dir: Some(dir.into()),
            globs: globs.into_iter().map(Into::into).collect(),
            file: None,
        }
    }

    /// Normalise into an absolute directory plus a filename predicate.
    pub fn resolve(&self, fs: &dyn FileSystem) -> Result<ResolvedPathSpec> {
        let (dir, matcher) = match non_empty(self.file.as_deref()) {
            Some(file) => {
                let name = file
                    .file_name()
                    .ok_or(ReloadwatchError::EmptyDirectory)?
                    .to_os_string();
                let parent = file.parent().unwrap_or(Path::new(""));
                // A bare filename lives in the current directory.
                let parent = if parent.as_os_str().is_empty() {
                    Path::new(".")
                } else {
                    parent
                };
                (parent.to_path_buf(), FilenameMatcher::Exact(name))
            }
            None => {
                let dir = non_empty(self.dir.as_deref()).ok_or(ReloadwatchError::EmptyDirectory)?;
                (dir.to_path_buf(), FilenameMatcher::from_globs(&self.globs)?)
            }
        };

        let dir = fs.absolute(&dir).unwrap_or(dir);
        Ok(ResolvedPathSpec { dir, matcher })
    }
}

fn non_empty(path: Option<&Path>) -> Option<&Path> {
    path.filter(|p| !p.as_os_str().is_empty())
}

impl fmt::Display for PathSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(file) = non_empty(self.file.as_deref()) {
            return write!(f, "file={}", file.display());
        }
        match non_empty(self.dir.as_deref()) {
            Some(dir) if self.globs.is_empty() => write!(f, "dir={}", dir.display()),
            Some(dir) => write!(f, "dir={} globs={:?}", dir.display(), self.globs),
            None => write!(f, "<empty>"),
        }
    }
}

/// Predicate over a bare filename (never a full path).
#[derive(Clone)]
pub enum FilenameMatcher {
    /// Explicit file: exact basename comparison, no glob interpretation.
    Exact(OsString),
    /// Any of the given shell-style globs.
    Globs(GlobSet),
    /// No globs configured: every file matches.
    Any,
}

impl FilenameMatcher {
    pub fn from_globs(patterns: &[String]) -> Result<Self> {
        if patterns.is_empty() {
            return Ok(FilenameMatcher::Any);
        }
        let mut builder = GlobSetBuilder::new();
        for pat in patterns {
            let glob = Glob::new(pat).map_err(|source| ReloadwatchError::InvalidGlob {
                pattern: pat.clone(),
                source,
            })?;
            builder.add(glob);
        }
        let set = builder.build().map_err(|source| ReloadwatchError::InvalidGlob {
            pattern: patterns.join(","),
            source,
        })?;
        Ok(FilenameMatcher::Globs(set))
    }

    pub fn matches(&self, file_name: &std::ffi::OsStr) -> bool {
        match self {
            FilenameMatcher::Exact(name) => name == file_name,
            FilenameMatcher::Globs(set) => set.is_match(Path::new(file_name)),
            FilenameMatcher::Any => true,
        }
    }
}

impl fmt::Debug for FilenameMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilenameMatcher::Exact(name) => f.debug_tuple("Exact").field(name).finish(),
            FilenameMatcher::Globs(set) => write!(f, "Globs({} patterns)", set.len()),
            FilenameMatcher::Any => f.write_str("Any"),
        }
    }
}

/// A [`PathSpec`] after resolution.
#[derive(Debug, Clone)]
pub struct ResolvedPathSpec {
    pub dir: PathBuf,
    pub matcher: FilenameMatcher,
}

impl ResolvedPathSpec {
    /// True if `path`'s basename satisfies this spec's predicate.
    pub fn matches(&self, path: &Path) -> bool {
        path.file_name()
            .is_some_and(|name| self.matcher.matches(name))
    }
}
