#![allow(dead_code)]

use std::path::PathBuf;

use reloadwatch::config::{ConfigFile, RawConfigFile, WatcherConfig};
use reloadwatch::types::Selector;
use reloadwatch::watch::PathSpec;

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile::default(),
        }
    }

    pub fn with_watcher(mut self, watcher: WatcherConfig) -> Self {
        self.config.watchers.push(watcher);
        self
    }

    pub fn with_default(mut self, default: WatcherConfig) -> Self {
        self.config.default = default;
        self
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `WatcherConfig`.
///
/// Starts from `restart` + `sha256` so the result is usable without a
/// `[default]` section.
pub struct WatcherConfigBuilder {
    watcher: WatcherConfig,
}

impl WatcherConfigBuilder {
    pub fn new() -> Self {
        Self {
            watcher: WatcherConfig::builtin_default(),
        }
    }

    /// Start from an all-empty config, so every field is inherited.
    pub fn empty() -> Self {
        Self {
            watcher: WatcherConfig::default(),
        }
    }

    pub fn dir(mut self, dir: impl Into<PathBuf>, globs: &[&str]) -> Self {
        self.watcher
            .paths
            .push(PathSpec::dir(dir, globs.iter().copied()));
        self
    }

    pub fn file(mut self, file: impl Into<PathBuf>) -> Self {
        self.watcher.paths.push(PathSpec::file(file));
        self
    }

    pub fn path_spec(mut self, spec: PathSpec) -> Self {
        self.watcher.paths.push(spec);
        self
    }

    pub fn name(mut self, name: &str) -> Self {
        self.watcher.selector = Selector::by_name(name);
        self
    }

    pub fn label(mut self, label: &str) -> Self {
        self.watcher.selector = Selector::by_label(label);
        self
    }

    pub fn action(mut self, action: &str) -> Self {
        self.watcher.action = action.to_string();
        self
    }

    pub fn hash(mut self, hash: &str) -> Self {
        self.watcher.hash = hash.to_string();
        self
    }

    pub fn build(self) -> WatcherConfig {
        self.watcher
    }
}

impl Default for WatcherConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
