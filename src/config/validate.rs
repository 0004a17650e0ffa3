// src/config/validate.rs

use crate::config::model::{ConfigFile, RawConfigFile, WatcherConfig};
use crate::errors::{ReloadwatchError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = ReloadwatchError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        let default = effective_default(raw.default);

        let watchers: Vec<WatcherConfig> = raw
            .watchers
            .into_iter()
            .map(|mut w| {
                w.apply_default(&default);
                w
            })
            .collect();

        ensure_has_watchers(&watchers)?;
        for (idx, w) in watchers.iter().enumerate() {
            validate_watcher(idx, w)?;
        }

        Ok(ConfigFile::new_unchecked(default, watchers))
    }
}

/// `[default]` layered over the built-in defaults.
fn effective_default(mut user: WatcherConfig) -> WatcherConfig {
    user.apply_default(&WatcherConfig::builtin_default());
    user
}

fn ensure_has_watchers(watchers: &[WatcherConfig]) -> Result<()> {
    if watchers.is_empty() {
        return Err(ReloadwatchError::ConfigError(
            "config must contain at least one [[watcher]] section".to_string(),
        ));
    }
    Ok(())
}

// Only presence is checked here. Hash names fail in `Watcher::configure`,
// action names at dispatch time and malformed path specs during the scan.
// An empty selector would match every running container.
fn validate_watcher(idx: usize, w: &WatcherConfig) -> Result<()> {
    if w.paths.is_empty() {
        return Err(ReloadwatchError::ConfigError(format!(
            "watcher #{idx} has no paths (and [default] provides none)"
        )));
    }
    if w.selector.is_empty() {
        return Err(ReloadwatchError::ConfigError(format!(
            "watcher #{idx} has no selector name or label (and [default] provides none)"
        )));
    }
    Ok(())
}
