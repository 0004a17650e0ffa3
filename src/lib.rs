// src/lib.rs

pub mod cli;
pub mod config;
pub mod container;
pub mod dispatch;
pub mod errors;
pub mod fs;
pub mod logging;
pub mod types;
pub mod watch;

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::task::JoinSet;
use tracing::{debug, error, info, trace};

use crate::cli::CliArgs;
use crate::config::{load_and_validate, ConfigFile};
use crate::container::{ContainerFilter, ContainerRuntime, DockerRuntime};
use crate::fs::{FileSystem, RealFileSystem};
use crate::watch::Watcher;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading and defaulting
/// - the Docker client (plus a one-off listing as a connectivity check)
/// - one watcher task per `[[watcher]]` entry
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = load_and_validate(&args.config)
        .with_context(|| format!("loading config from {}", args.config))?;
    trace!("config loaded");

    if args.dry_run {
        print_dry_run(&cfg);
        return Ok(());
    }

    let docker = DockerRuntime::connect()?;
    trace!("docker client initialized");

    docker
        .list_containers(&ContainerFilter::default())
        .await
        .context("can't list containers")?;

    let runtime: Arc<dyn ContainerRuntime> = Arc::new(docker);
    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);

    run_watchers(&cfg, fs, runtime).await;
    Ok(())
}

/// Configure every watcher in `cfg`.
///
/// A watcher whose configure step fails (unsupported hash algorithm) is
/// logged and left out; the others are unaffected. Returns the configured
/// watchers and the total number of tracked files.
pub fn configure_watchers(
    cfg: &ConfigFile,
    fs: Arc<dyn FileSystem>,
    runtime: Arc<dyn ContainerRuntime>,
) -> (Vec<Watcher>, usize) {
    let mut watchers = Vec::with_capacity(cfg.watchers.len());
    let mut file_count = 0;

    for (idx, watcher_cfg) in cfg.watchers.iter().enumerate() {
        let name = format!("watcher-{idx}");
        match Watcher::configure(&name, watcher_cfg.clone(), Arc::clone(&fs), Arc::clone(&runtime)) {
            Ok((watcher, report)) => {
                trace!(watcher = %name, config = ?watcher_cfg, "watcher initialized");
                file_count += report.tracked_files;
                watchers.push(watcher);
            }
            Err(err) => {
                error!(watcher = %name, error = %err, "error initializing watcher");
            }
        }
    }

    (watchers, file_count)
}

/// Configure all watchers, run each on its own task and wait for all of them.
pub async fn run_watchers(
    cfg: &ConfigFile,
    fs: Arc<dyn FileSystem>,
    runtime: Arc<dyn ContainerRuntime>,
) {
    let (watchers, file_count) = configure_watchers(cfg, fs, runtime);

    info!(
        "started {} watchers, {} files total",
        watchers.len(),
        file_count
    );

    let mut tasks = JoinSet::new();
    for watcher in watchers {
        tasks.spawn(async move {
            let name = watcher.name().to_string();
            (name, watcher.run().await)
        });
    }

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((name, Ok(()))) => debug!(watcher = %name, "watcher exited"),
            Ok((name, Err(err))) => error!(watcher = %name, error = %err, "watcher failed"),
            Err(err) => error!(error = %err, "watcher task panicked or was cancelled"),
        }
    }

    trace!("all watchers exited, stopping");
}

/// Print the watchers as they look after defaulting.
fn print_dry_run(cfg: &ConfigFile) {
    println!("reloadwatch dry-run");
    println!("watchers ({}):", cfg.watchers.len());
    for (idx, w) in cfg.watchers.iter().enumerate() {
        println!("  - watcher-{idx}");
        println!("      selector: {}", w.selector);
        println!("      action: {}", w.action);
        println!("      hash: {}", w.hash);
        for spec in &w.paths {
            println!("      path: {spec}");
        }
    }

    debug!("dry-run complete (nothing watched)");
}
