//! Application layer - Use case services.
//!
//! Services orchestrate domain logic over the [`ClusterGateway`](crate::ports::ClusterGateway)
//! port, so they can be driven by kubectl in production and by an in-memory
//! gateway in tests.

mod cancel;
mod context_monitor;
mod forward_service;
mod forward_supervisor;
mod pod_resolver;

#[cfg(test)]
pub(crate) mod mock;

pub use cancel::{CancelSignal, CancelSource};
pub use context_monitor::{ContextMonitor, DEFAULT_POLL_INTERVAL};
pub use forward_service::ForwardService;
pub use forward_supervisor::{ForwardState, ForwardSupervisor, MappingGroup, DEFAULT_RETRY_BACKOFF};
pub use pod_resolver::{select_pod, PodResolver};
