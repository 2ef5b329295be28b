//! Restarting dynamic mappings when the active context changes.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, info};

use super::cancel::CancelSignal;
use super::forward_supervisor::ForwardSupervisor;
use crate::domain::PodMapping;
use crate::ports::ClusterGateway;

/// How often the current context is read.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Polls the current context and re-derives the dynamic mapping group on change.
pub struct ContextMonitor<G: ClusterGateway> {
    supervisor: Arc<ForwardSupervisor<G>>,
    poll_interval: Duration,
}

impl<G: ClusterGateway> ContextMonitor<G> {
    /// Creates a monitor with the default poll interval.
    pub fn new(supervisor: Arc<ForwardSupervisor<G>>) -> Self {
        Self {
            supervisor,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Overrides the poll interval.
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Supervises the dynamic mappings among `mappings` until `shutdown` fires.
    ///
    /// Static mappings are ignored. Returns once every tunnel it started is gone.
    pub async fn run(&self, mappings: &[PodMapping], mut shutdown: CancelSignal) {
        let dynamic: Vec<PodMapping> = mappings
            .iter()
            .filter(|mapping| mapping.is_dynamic())
            .cloned()
            .collect();
        if dynamic.is_empty() {
            return;
        }

        let gateway = self.supervisor.gateway();
        let mut context = tokio::select! {
            context = gateway.current_context() => context.unwrap_or_default(),
            _ = shutdown.cancelled() => return,
        };
        info!(context = %context, mappings = dynamic.len(), "Following current context");
        let mut group = self.supervisor.spawn_group(&dynamic, &context);

        loop {
            tokio::select! {
                _ = sleep(self.poll_interval) => {}
                _ = shutdown.cancelled() => break,
            }

            let observed = tokio::select! {
                observed = gateway.current_context() => observed,
                _ = shutdown.cancelled() => break,
            };
            // Unreadable context: assume nothing changed.
            let Some(observed) = observed else {
                debug!(context = %context, "Current context unavailable, keeping previous");
                continue;
            };
            if observed == context {
                continue;
            }

            info!(
                from = %context,
                to = %observed,
                mappings = dynamic.len(),
                "Context changed, restarting dynamic mappings"
            );
            group.shutdown().await;
            gateway.evict_pods(&context);
            context = observed;
            group = self.supervisor.spawn_group(&dynamic, &context);
        }

        group.shutdown().await;
    }
}
