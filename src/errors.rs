// src/errors.rs

//! Crate-wide error type and result alias.
//!
//! Most of these errors are *local*: they are logged where they happen and
//! the owning watcher keeps going. Only configuration and Docker bootstrap
//! failures are fatal to the process.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReloadwatchError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Unsupported hash algorithm: {0}")]
    UnsupportedAlgorithm(String),

    #[error("Path spec has an empty directory")]
    EmptyDirectory,

    #[error("Invalid glob pattern '{pattern}': {source}")]
    InvalidGlob {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("Cannot read file {path:?}: {source}")]
    FileUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Cannot watch directory {path:?}: {source}")]
    SubscriptionFailure {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },

    #[error("Listing containers failed: {0}")]
    RuntimeQuery(String),

    #[error("Action on container {container} failed: {message}")]
    RuntimeAction { container: String, message: String },

    #[error("Unknown action: {0}")]
    UnknownAction(String),

    #[error("Dispatch timed out after {0:?}")]
    DispatchTimeout(std::time::Duration),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, ReloadwatchError>;
