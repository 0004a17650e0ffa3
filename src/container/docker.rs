// src/container/docker.rs

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use bollard::Docker;
use bollard::container::{KillContainerOptions, ListContainersOptions, RestartContainerOptions};
use tracing::debug;

use crate::errors::{ReloadwatchError, Result};

use super::{ContainerFilter, ContainerInfo, ContainerRuntime, RuntimeFuture};

/// Docker Engine API client.
#[derive(Clone)]
pub struct DockerRuntime {
    docker: Docker,
}

impl fmt::Debug for DockerRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DockerRuntime").finish_non_exhaustive()
    }
}

impl DockerRuntime {
    /// Connect using the environment (`DOCKER_HOST`, or the platform's
    /// local socket when unset).
    pub fn connect() -> Result<Self> {
        let docker = Docker::connect_with_defaults()
            .map_err(|e| ReloadwatchError::RuntimeQuery(format!("connecting to Docker: {e}")))?;
        Ok(Self { docker })
    }
}

fn build_filters(filter: &ContainerFilter) -> HashMap<String, Vec<String>> {
    let mut filters = HashMap::new();
    if let Some(name) = &filter.name {
        filters.insert("name".to_string(), vec![name.clone()]);
    }
    if let Some(label) = &filter.label {
        filters.insert("label".to_string(), vec![label.clone()]);
    }
    filters
}

impl ContainerRuntime for DockerRuntime {
    fn list_containers<'a>(&'a self, filter: &'a ContainerFilter) -> RuntimeFuture<'a, Vec<ContainerInfo>> {
        Box::pin(async move {
            let options = ListContainersOptions::<String> {
                all: false,
                filters: build_filters(filter),
                ..Default::default()
            };
            debug!(?filter, "listing containers");

            let summaries = self
                .docker
                .list_containers(Some(options))
                .await
                .map_err(|e| ReloadwatchError::RuntimeQuery(e.to_string()))?;

            Ok(summaries
                .into_iter()
                .filter_map(|c| {
                    let id = c.id?;
                    Some(ContainerInfo {
                        id,
                        names: c.names.unwrap_or_default(),
                    })
                })
                .collect())
        })
    }

    fn restart<'a>(&'a self, id: &'a str, timeout: Duration) -> RuntimeFuture<'a, ()> {
        Box::pin(async move {
            let t = isize::try_from(timeout.as_secs()).unwrap_or(isize::MAX);
            self.docker
                .restart_container(id, Some(RestartContainerOptions { t }))
                .await
                .map_err(|e| ReloadwatchError::RuntimeAction {
                    container: id.to_string(),
                    message: e.to_string(),
                })
        })
    }

    fn signal<'a>(&'a self, id: &'a str, signal: &'a str) -> RuntimeFuture<'a, ()> {
        Box::pin(async move {
            self.docker
                .kill_container(id, Some(KillContainerOptions { signal }))
                .await
                .map_err(|e| ReloadwatchError::RuntimeAction {
                    container: id.to_string(),
                    message: e.to_string(),
                })
        })
    }
}
