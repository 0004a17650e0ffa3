// src/config/model.rs

use serde::Deserialize;

use crate::types::Selector;
use crate::watch::PathSpec;

pub const DEFAULT_ACTION: &str = "restart";
pub const DEFAULT_HASH: &str = "sha256";

/// Configuration as read from TOML, before defaults are applied.
///
/// ```toml
/// [default]
/// action = "restart"
/// hash = "sha256"
/// selector = { label = "reload=true" }
///
/// [[watcher]]
/// paths = [{ dir = "/etc/app", globs = ["*.conf"] }]
///
/// [[watcher]]
/// paths = [{ file = "/etc/nginx/nginx.conf" }]
/// selector = { name = "nginx" }
/// action = "sighup"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    /// Values inherited by watchers that leave a field empty.
    #[serde(default)]
    pub default: WatcherConfig,

    /// All `[[watcher]]` entries, in file order.
    #[serde(default, rename = "watcher")]
    pub watchers: Vec<WatcherConfig>,
}

/// Validated configuration: every watcher has its defaults applied.
///
/// Built through `TryFrom<RawConfigFile>`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub default: WatcherConfig,
    pub watchers: Vec<WatcherConfig>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(default: WatcherConfig, watchers: Vec<WatcherConfig>) -> Self {
        Self { default, watchers }
    }
}

/// One `[[watcher]]` section (also used for `[default]`).
///
/// `action` and `hash` are kept as strings: unknown hash names are reported
/// when the watcher is configured, unknown actions only when a change fires.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct WatcherConfig {
    #[serde(default)]
    pub paths: Vec<PathSpec>,

    #[serde(default)]
    pub selector: Selector,

    #[serde(default)]
    pub action: String,

    #[serde(default)]
    pub hash: String,
}

impl WatcherConfig {
    /// Built-in defaults: `restart`, `sha256`, nothing else.
    pub fn builtin_default() -> Self {
        Self {
            action: DEFAULT_ACTION.to_string(),
            hash: DEFAULT_HASH.to_string(),
            ..Self::default()
        }
    }

    /// Fill empty fields from `def`.
    ///
    /// The selector is inherited as a whole, and only when neither name nor
    /// label is set.
    pub fn apply_default(&mut self, def: &WatcherConfig) {
        if self.hash.trim().is_empty() {
            self.hash = def.hash.clone();
        }
        if self.action.trim().is_empty() {
            self.action = def.action.clone();
        }
        if self.selector.is_empty() {
            self.selector = def.selector.clone();
        }
        if self.paths.is_empty() {
            self.paths = def.paths.clone();
        }
    }
}
