use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use reloadwatch::container::{ContainerFilter, ContainerInfo, ContainerRuntime, RuntimeFuture};
use reloadwatch::errors::ReloadwatchError;

/// A call the fake runtime received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeCall {
    List(ContainerFilter),
    Restart(String),
    Signal(String, String),
}

/// A fake container runtime that:
/// - returns a fixed container list for every query
/// - records every call it receives
/// - fails actions for ids registered with `fail_on`
#[derive(Clone, Default)]
pub struct FakeContainerRuntime {
    containers: Arc<Mutex<Vec<ContainerInfo>>>,
    failing: Arc<Mutex<HashSet<String>>>,
    list_error: Arc<Mutex<Option<String>>>,
    list_delay: Option<Duration>,
    calls: Arc<Mutex<Vec<RuntimeCall>>>,
}

impl FakeContainerRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_container(self, id: &str, name: &str) -> Self {
        self.containers.lock().unwrap().push(ContainerInfo {
            id: id.to_string(),
            names: vec![format!("/{name}")],
        });
        self
    }

    pub fn fail_on(self, id: &str) -> Self {
        self.failing.lock().unwrap().insert(id.to_string());
        self
    }

    pub fn fail_listing(self, message: &str) -> Self {
        *self.list_error.lock().unwrap() = Some(message.to_string());
        self
    }

    /// Make `list_containers` sleep before answering.
    pub fn with_list_delay(mut self, delay: Duration) -> Self {
        self.list_delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<RuntimeCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Only restart/signal calls, in order.
    pub fn actions(&self) -> Vec<RuntimeCall> {
        self.calls()
            .into_iter()
            .filter(|c| !matches!(c, RuntimeCall::List(_)))
            .collect()
    }

    fn record(&self, call: RuntimeCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn action_result(&self, id: &str) -> reloadwatch::errors::Result<()> {
        if self.failing.lock().unwrap().contains(id) {
            return Err(ReloadwatchError::RuntimeAction {
                container: id.to_string(),
                message: "injected failure".to_string(),
            });
        }
        Ok(())
    }
}

impl ContainerRuntime for FakeContainerRuntime {
    fn list_containers<'a>(&'a self, filter: &'a ContainerFilter) -> RuntimeFuture<'a, Vec<ContainerInfo>> {
        Box::pin(async move {
            self.record(RuntimeCall::List(filter.clone()));
            if let Some(delay) = self.list_delay {
                tokio::time::sleep(delay).await;
            }
            let error = self.list_error.lock().unwrap().clone();
            if let Some(message) = error {
                return Err(ReloadwatchError::RuntimeQuery(message));
            }
            Ok(self.containers.lock().unwrap().clone())
        })
    }

    fn restart<'a>(&'a self, id: &'a str, _timeout: Duration) -> RuntimeFuture<'a, ()> {
        Box::pin(async move {
            self.record(RuntimeCall::Restart(id.to_string()));
            self.action_result(id)
        })
    }

    fn signal<'a>(&'a self, id: &'a str, signal: &'a str) -> RuntimeFuture<'a, ()> {
        Box::pin(async move {
            self.record(RuntimeCall::Signal(id.to_string(), signal.to_string()));
            self.action_result(id)
        })
    }
}
