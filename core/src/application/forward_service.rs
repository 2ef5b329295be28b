//! Top-level orchestration of a mapping set.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use super::cancel::CancelSignal;
use super::context_monitor::{ContextMonitor, DEFAULT_POLL_INTERVAL};
use super::forward_supervisor::{ForwardSupervisor, DEFAULT_RETRY_BACKOFF};
use crate::domain::PodMapping;
use crate::ports::ClusterGateway;

/// Service forwarding every configured mapping until shutdown.
///
/// Mappings pinned to a cluster run for the whole session; the others follow
/// the current context through a [`ContextMonitor`].
pub struct ForwardService<G: ClusterGateway> {
    gateway: Arc<G>,
    retry_backoff: Duration,
    poll_interval: Duration,
}

impl<G: ClusterGateway> ForwardService<G> {
    /// Create a new forward service.
    pub fn new(gateway: Arc<G>) -> Self {
        Self {
            gateway,
            retry_backoff: DEFAULT_RETRY_BACKOFF,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    pub fn with_retry_backoff(mut self, retry_backoff: Duration) -> Self {
        self.retry_backoff = retry_backoff;
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Forward `mappings` until `shutdown` fires, then stop every tunnel.
    pub async fn run(&self, mappings: &[PodMapping], shutdown: CancelSignal) {
        let supervisor = Arc::new(
            ForwardSupervisor::new(Arc::clone(&self.gateway)).with_retry_backoff(self.retry_backoff),
        );

        let (dynamic, pinned): (Vec<PodMapping>, Vec<PodMapping>) =
            mappings.iter().cloned().partition(PodMapping::is_dynamic);
        info!(
            dynamic = dynamic.len(),
            pinned = pinned.len(),
            "Starting port forwarding"
        );

        let pinned_group = supervisor.spawn_group(&pinned, "");
        let monitor =
            ContextMonitor::new(Arc::clone(&supervisor)).with_poll_interval(self.poll_interval);

        let mut pinned_shutdown = shutdown.clone();
        tokio::join!(monitor.run(&dynamic, shutdown), async move {
            pinned_shutdown.cancelled().await;
            pinned_group.shutdown().await;
        });

        info!("All port forwarding stopped");
    }
}
