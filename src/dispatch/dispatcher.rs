// src/dispatch/dispatcher.rs

use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::container::{ContainerFilter, ContainerInfo, ContainerRuntime};
use crate::errors::{ReloadwatchError, Result};
use crate::types::{Action, Selector};

/// Upper bound for one whole dispatch (listing plus every action call).
pub const DISPATCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Grace period handed to the runtime when restarting a container.
pub const RESTART_TIMEOUT: Duration = Duration::from_secs(10);

/// Outcome counts for a single dispatch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub matched: usize,
    pub succeeded: usize,
    pub failed: usize,
}

/// Apply `action` to every container matched by `selector`, bounded by
/// [`DISPATCH_TIMEOUT`].
pub async fn dispatch(
    runtime: &dyn ContainerRuntime,
    selector: &Selector,
    action: &str,
) -> Result<DispatchReport> {
    dispatch_with_timeout(runtime, selector, action, DISPATCH_TIMEOUT).await
}

/// Same as [`dispatch`] with an explicit deadline.
///
/// The action name is parsed before any runtime call, so an unknown action
/// fails with [`ReloadwatchError::UnknownAction`] even when no container
/// would have matched. After that, only a failed container listing or the
/// deadline abort the dispatch. A failure on one container is logged and
/// counted in [`DispatchReport::failed`]; the remaining containers are still
/// attempted.
pub async fn dispatch_with_timeout(
    runtime: &dyn ContainerRuntime,
    selector: &Selector,
    action: &str,
    timeout: Duration,
) -> Result<DispatchReport> {
    // Misconfigured actions only surface once a change actually fires.
    let action: Action = action.parse()?;

    tokio::time::timeout(timeout, run_dispatch(runtime, selector, &action))
        .await
        .map_err(|_| ReloadwatchError::DispatchTimeout(timeout))?
}

async fn run_dispatch(
    runtime: &dyn ContainerRuntime,
    selector: &Selector,
    action: &Action,
) -> Result<DispatchReport> {
    let filter = ContainerFilter::from(selector);
    let containers = runtime.list_containers(&filter).await?;

    let mut report = DispatchReport {
        matched: containers.len(),
        ..DispatchReport::default()
    };

    if containers.is_empty() {
        warn!(%selector, "no containers found for selector");
        return Ok(report);
    }

    debug!(%selector, %action, count = containers.len(), "dispatching action");

    for ctr in &containers {
        match apply(runtime, ctr, action).await {
            Ok(()) => report.succeeded += 1,
            Err(err) => {
                error!(
                    container = %ctr.short_id(),
                    %action,
                    error = %err,
                    "action failed"
                );
                report.failed += 1;
            }
        }
    }

    Ok(report)
}

async fn apply(runtime: &dyn ContainerRuntime, ctr: &ContainerInfo, action: &Action) -> Result<()> {
    match action {
        Action::Restart => {
            info!(
                "restarting container {} ({})",
                ctr.display_name(),
                ctr.short_id()
            );
            runtime.restart(&ctr.id, RESTART_TIMEOUT).await
        }
        Action::Signal(signal) => {
            info!(
                "sending {} to container {} ({})",
                signal,
                ctr.display_name(),
                ctr.short_id()
            );
            runtime.signal(&ctr.id, signal).await
        }
    }
}
