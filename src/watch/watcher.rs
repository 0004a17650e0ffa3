// src/watch/watcher.rs

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::anyhow;
use notify::event::{ModifyKind, RenameMode};
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher as _};
use tokio::sync::mpsc;
use tracing::{debug, error, info, trace};

use crate::config::WatcherConfig;
use crate::container::ContainerRuntime;
use crate::dispatch::dispatch;
use crate::errors::{ReloadwatchError, Result};
use crate::fs::FileSystem;
use crate::watch::digest::HashAlgorithm;
use crate::watch::hash::{compute_salted_hash, Salt};
use crate::watch::scanner::{scan, ScanReport};
use crate::watch::table::{ChangeOutcome, TrackedFileTable};

/// Message forwarded from the `notify` callback into the async loop.
#[derive(Debug)]
pub enum WatchMessage {
    Event(Event),
    Error(notify::Error),
}

/// Events that can change a digest: creation, content writes and a rename
/// landing on a path (an atomic save renames a temp file over the target).
/// Removals, the source side of a rename, metadata and access events are
/// ignored.
pub fn is_content_event(kind: &EventKind) -> bool {
    matches!(
        kind,
        EventKind::Create(_)
            | EventKind::Modify(ModifyKind::Data(_))
            | EventKind::Modify(ModifyKind::Any)
            | EventKind::Modify(ModifyKind::Name(RenameMode::To | RenameMode::Both))
    )
}

/// Paths of `event` whose content may have changed.
///
/// A `Both` rename carries `[from, to]`; only the destination counts.
pub fn content_paths(event: &Event) -> &[PathBuf] {
    match event.kind {
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)) => {
            &event.paths[event.paths.len().saturating_sub(1)..]
        }
        ref kind if is_content_event(kind) => &event.paths,
        _ => &[],
    }
}

/// One configured watcher: its salt, its tracked files and the directories it
/// listens on.
pub struct Watcher {
    name: String,
    config: WatcherConfig,
    algorithm: HashAlgorithm,
    salt: Arc<Salt>,
    table: Arc<TrackedFileTable>,
    watch_dirs: Vec<PathBuf>,
    fs: Arc<dyn FileSystem>,
    runtime: Arc<dyn ContainerRuntime>,
}

impl fmt::Debug for Watcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Watcher")
            .field("name", &self.name)
            .field("algorithm", &self.algorithm)
            .field("watch_dirs", &self.watch_dirs)
            .finish_non_exhaustive()
    }
}

impl Watcher {
    /// Pick the algorithm, generate the salt and run the initial scan.
    ///
    /// Fails only on an unsupported hash algorithm; path spec and file
    /// problems are logged by the scanner and skipped.
    pub fn configure(
        name: impl Into<String>,
        config: WatcherConfig,
        fs: Arc<dyn FileSystem>,
        runtime: Arc<dyn ContainerRuntime>,
    ) -> Result<(Self, ScanReport)> {
        let algorithm: HashAlgorithm = config.hash.parse()?;
        let salt = Salt::generate(algorithm);
        Self::configure_with_salt(name, config, algorithm, salt, fs, runtime)
    }

    /// Like [`Watcher::configure`] with a caller-provided salt.
    pub fn configure_with_salt(
        name: impl Into<String>,
        config: WatcherConfig,
        algorithm: HashAlgorithm,
        salt: Salt,
        fs: Arc<dyn FileSystem>,
        runtime: Arc<dyn ContainerRuntime>,
    ) -> Result<(Self, ScanReport)> {
        let name = name.into();
        let table = TrackedFileTable::new();
        let report = scan(fs.as_ref(), &config.paths, algorithm, &salt, &table);

        debug!(
            watcher = %name,
            files = report.tracked_files,
            dirs = ?report.watch_dirs,
            "initial scan complete"
        );

        let watcher = Self {
            name,
            config,
            algorithm,
            salt: Arc::new(salt),
            table: Arc::new(table),
            watch_dirs: report.watch_dirs.clone(),
            fs,
            runtime,
        };
        Ok((watcher, report))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }

    pub fn salt(&self) -> &Salt {
        &self.salt
    }

    pub fn table(&self) -> &TrackedFileTable {
        &self.table
    }

    pub fn watch_dirs(&self) -> &[PathBuf] {
        &self.watch_dirs
    }

    /// Re-hash `path` if it is tracked and dispatch the configured action when
    /// its digest changed.
    ///
    /// A hashing failure is returned without touching the table; the file
    /// keeps its last digest and is retried on the next event.
    pub async fn check_and_maybe_dispatch(&self, path: &Path) -> Result<ChangeOutcome> {
        if !self.table.contains(path) {
            return Ok(ChangeOutcome::Untracked);
        }

        let table = Arc::clone(&self.table);
        let fs = Arc::clone(&self.fs);
        let salt = Arc::clone(&self.salt);
        let algorithm = self.algorithm;
        let owned_path = path.to_path_buf();

        let outcome = tokio::task::spawn_blocking(move || {
            table.compare_and_update(&owned_path, || {
                compute_salted_hash(fs.as_ref(), &owned_path, algorithm, &salt)
            })
        })
        .await
        .map_err(|e| ReloadwatchError::Other(anyhow!("hashing task failed: {e}")))??;

        if let ChangeOutcome::Changed { previous, current } = &outcome {
            trace!(watcher = %self.name, was = %previous, now = %current, "hashes differ");
            info!(watcher = %self.name, "detected change in {}", path.display());

            match dispatch(self.runtime.as_ref(), &self.config.selector, &self.config.action).await {
                Ok(report) => debug!(watcher = %self.name, ?report, "dispatch finished"),
                Err(err) => error!(watcher = %self.name, error = %err, "dispatch failed"),
            }
        }

        Ok(outcome)
    }

    /// Consume notifications until the channel closes.
    pub async fn run_event_loop(&self, mut rx: mpsc::UnboundedReceiver<WatchMessage>) {
        while let Some(msg) = rx.recv().await {
            match msg {
                WatchMessage::Event(event) => {
                    trace!(watcher = %self.name, ?event, "received event");
                    let paths = content_paths(&event);
                    if paths.is_empty() {
                        continue;
                    }
                    for path in paths {
                        if let Err(err) = self.check_and_maybe_dispatch(path).await {
                            error!(watcher = %self.name, error = %err, "cannot re-check file");
                        }
                    }
                    debug!(watcher = %self.name, paths = ?event.paths, "handled event");
                }
                WatchMessage::Error(err) => {
                    error!(watcher = %self.name, error = %err, "watcher error");
                }
            }
        }
        debug!(watcher = %self.name, "event channel closed; watcher stopped");
    }

    /// Subscribe to every watch directory and run the event loop.
    ///
    /// Returns an error only when the OS watcher cannot be created at all. A
    /// directory that cannot be subscribed is logged and left unmonitored.
    pub async fn run(self) -> Result<()> {
        let (event_tx, event_rx) = mpsc::unbounded_channel::<WatchMessage>();

        let mut fs_watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| {
                let msg = match res {
                    Ok(event) => WatchMessage::Event(event),
                    Err(err) => WatchMessage::Error(err),
                };
                // Receiver gone means the loop already stopped.
                let _ = event_tx.send(msg);
            },
            Config::default(),
        )
        .map_err(|e| ReloadwatchError::Other(anyhow!("creating file watcher: {e}")))?;

        for dir in &self.watch_dirs {
            if let Err(source) = fs_watcher.watch(dir, RecursiveMode::NonRecursive) {
                let err = ReloadwatchError::SubscriptionFailure {
                    path: dir.clone(),
                    source,
                };
                error!(watcher = %self.name, error = %err, "skipping directory");
                continue;
            }
            debug!(watcher = %self.name, "watching dir {}", dir.display());
        }

        self.run_event_loop(event_rx).await;
        drop(fs_watcher);
        Ok(())
    }
}
