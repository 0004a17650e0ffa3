// src/container/mod.rs

//! Container runtime abstraction.
//!
//! The dispatcher talks to a [`ContainerRuntime`] instead of a Docker client
//! directly, so tests can record calls with a fake runtime while production
//! uses [`docker::DockerRuntime`].

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use crate::errors::Result;
use crate::types::Selector;

pub mod docker;

pub use docker::DockerRuntime;

/// Boxed future returned by [`ContainerRuntime`] methods.
pub type RuntimeFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// Query used to list containers. Only set fields become filters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerFilter {
    pub name: Option<String>,
    pub label: Option<String>,
}

impl From<&Selector> for ContainerFilter {
    fn from(selector: &Selector) -> Self {
        Self {
            name: selector.name().map(str::to_string),
            label: selector.label().map(str::to_string),
        }
    }
}

/// The subset of a listed container the dispatcher needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerInfo {
    pub id: String,
    pub names: Vec<String>,
}

impl ContainerInfo {
    /// First 12 characters of the id, as `docker ps` shows it.
    pub fn short_id(&self) -> &str {
        let end = self
            .id
            .char_indices()
            .nth(12)
            .map(|(i, _)| i)
            .unwrap_or(self.id.len());
        &self.id[..end]
    }

    /// Primary name without Docker's leading slash, falling back to the id.
    pub fn display_name(&self) -> &str {
        self.names
            .first()
            .map(|n| n.trim_start_matches('/'))
            .unwrap_or_else(|| self.short_id())
    }
}

/// Operations the dispatcher needs from a container runtime.
pub trait ContainerRuntime: Send + Sync {
    /// Running containers matching `filter`.
    fn list_containers<'a>(&'a self, filter: &'a ContainerFilter) -> RuntimeFuture<'a, Vec<ContainerInfo>>;

    /// Restart a container, giving it `timeout` to stop gracefully.
    fn restart<'a>(&'a self, id: &'a str, timeout: Duration) -> RuntimeFuture<'a, ()>;

    /// Send a named signal (e.g. `SIGHUP`) to a container.
    fn signal<'a>(&'a self, id: &'a str, signal: &'a str) -> RuntimeFuture<'a, ()>;
}
