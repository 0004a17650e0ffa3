use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

use crate::errors::ReloadwatchError;

/// Which containers an action applies to.
///
/// Both fields may be set; empty fields are left out of the runtime query.
/// In practice only one of them is expected to be meaningful.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Selector {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
}

impl Selector {
    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            label: None,
        }
    }

    pub fn by_label(label: impl Into<String>) -> Self {
        Self {
            name: None,
            label: Some(label.into()),
        }
    }

    /// `name`, if set and non-empty.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref().filter(|s| !s.is_empty())
    }

    /// `label`, if set and non-empty.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref().filter(|s| !s.is_empty())
    }

    /// True when neither name nor label carries a value.
    pub fn is_empty(&self) -> bool {
        self.name().is_none() && self.label().is_none()
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.name(), self.label()) {
            (Some(n), Some(l)) => write!(f, "name={n}, label={l}"),
            (Some(n), None) => write!(f, "name={n}"),
            (None, Some(l)) => write!(f, "label={l}"),
            (None, None) => write!(f, "<empty>"),
        }
    }
}

/// Lifecycle operation applied to every selected container.
///
/// Accepted spellings:
/// - `restart`
/// - `sighup` (shorthand for `signal:SIGHUP`)
/// - `signal:<NAME>`, e.g. `signal:SIGUSR1`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Restart,
    Signal(String),
}

impl FromStr for Action {
    type Err = ReloadwatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        match trimmed.to_lowercase().as_str() {
            "restart" => return Ok(Action::Restart),
            "sighup" => return Ok(Action::Signal("SIGHUP".to_string())),
            _ => {}
        }
        match trimmed.split_once(':') {
            Some((kind, signal)) if kind.eq_ignore_ascii_case("signal") && !signal.trim().is_empty() => {
                Ok(Action::Signal(signal.trim().to_uppercase()))
            }
            _ => Err(ReloadwatchError::UnknownAction(s.to_string())),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Restart => write!(f, "restart"),
            Action::Signal(sig) => write!(f, "signal:{sig}"),
        }
    }
}
