// src/dispatch/mod.rs

//! Action dispatch: turn "a tracked file changed" into restart/signal calls
//! against the containers a watcher's selector picks out.
//!
//! - [`dispatcher`] holds [`dispatch`] and the per-container fan-out.
//! - The container runtime itself lives behind
//!   [`ContainerRuntime`](crate::container::ContainerRuntime).

pub mod dispatcher;

pub use dispatcher::{dispatch, dispatch_with_timeout, DispatchReport, DISPATCH_TIMEOUT, RESTART_TIMEOUT};
