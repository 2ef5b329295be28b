//! Per-mapping retry loop keeping one tunnel alive.
//!
//! Each mapping cycles `Resolving -> Forwarding -> Idle -> Resolving` until its
//! cancellation signal fires, at which point any live tunnel is killed
//! (descendants included) before the loop returns.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use super::cancel::{CancelSignal, CancelSource};
use super::pod_resolver::PodResolver;
use crate::domain::PodMapping;
use crate::ports::{ClusterGateway, TunnelHandle};

/// Delay between a tunnel ending (or a failed resolution) and the next attempt.
pub const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_millis(500);

/// State of one mapping loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForwardState {
    Resolving,
    Forwarding,
    Idle,
    Cancelled,
}

impl ForwardState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Resolving => "resolving",
            Self::Forwarding => "forwarding",
            Self::Idle => "idle",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Runs the retry loops of mappings against a [`ClusterGateway`].
pub struct ForwardSupervisor<G: ClusterGateway> {
    gateway: Arc<G>,
    resolver: PodResolver<G>,
    retry_backoff: Duration,
}

impl<G: ClusterGateway> ForwardSupervisor<G> {
    /// Creates a supervisor with the default retry backoff.
    pub fn new(gateway: Arc<G>) -> Self {
        Self {
            resolver: PodResolver::new(Arc::clone(&gateway)),
            gateway,
            retry_backoff: DEFAULT_RETRY_BACKOFF,
        }
    }

    /// Overrides the retry backoff.
    pub fn with_retry_backoff(mut self, retry_backoff: Duration) -> Self {
        self.retry_backoff = retry_backoff;
        self
    }

    /// Returns the gateway.
    pub fn gateway(&self) -> &Arc<G> {
        &self.gateway
    }

    /// Keeps `mapping` forwarded until `cancel` fires.
    ///
    /// `current_context` is used for dynamic mappings; static mappings use
    /// their own cluster. Never fails: every error leads to a retry.
    pub async fn run_mapping(
        &self,
        mapping: &PodMapping,
        current_context: &str,
        mut cancel: CancelSignal,
    ) -> ForwardState {
        let context = mapping.effective_context(current_context);
        let source = mapping.source();
        let mut misses: u32 = 0;

        loop {
            if cancel.is_cancelled() {
                break;
            }

            trace_state(mapping, ForwardState::Resolving);
            let pod = tokio::select! {
                pod = self.resolver.resolve(context, mapping) => pod,
                _ = cancel.cancelled() => break,
            };

            match pod {
                None => {
                    misses += 1;
                    if misses == 1 {
                        warn!(
                            local_port = mapping.local_port,
                            pod = %mapping.name,
                            namespace = %mapping.namespace,
                            context,
                            "Cannot find pod, will keep retrying"
                        );
                    } else {
                        debug!(local_port = mapping.local_port, misses, "Pod still not found");
                    }
                }
                Some(pod) => {
                    misses = 0;
                    let target = mapping.target(context, &pod);
                    match self.gateway.start_port_forward(&target) {
                        Ok(mut tunnel) => {
                            trace_state(mapping, ForwardState::Forwarding);
                            info!(pid = ?tunnel.id(), "Forwarding {} to {}", source, target);

                            let exit = tokio::select! {
                                exit = tunnel.wait() => Some(exit),
                                _ = cancel.cancelled() => None,
                            };

                            match &exit {
                                Some(Ok(code)) => info!(
                                    ?code,
                                    "Port forwarding on {} --> {} was terminated. Will try to reload",
                                    source,
                                    target
                                ),
                                Some(Err(e)) => warn!(
                                    error = %e,
                                    "Lost track of port forwarding on {} --> {}. Will try to reload",
                                    source,
                                    target
                                ),
                                None => {}
                            }

                            // The leader may be gone while processes it spawned are not.
                            if let Err(e) = tunnel.kill().await {
                                warn!(error = %e, "Failed to stop port forwarding on {}", source);
                            }
                            if exit.is_none() {
                                break;
                            }
                        }
                        Err(e) => {
                            warn!(error = %e, "Failed to start port forwarding {} to {}", source, target);
                        }
                    }
                }
            }

            trace_state(mapping, ForwardState::Idle);
            tokio::select! {
                _ = sleep(self.retry_backoff) => {}
                _ = cancel.cancelled() => break,
            }
        }

        trace_state(mapping, ForwardState::Cancelled);
        info!("Port forwarding on {} was cancelled", source);
        ForwardState::Cancelled
    }

    /// Starts one loop per mapping under a fresh cancellation scope.
    pub fn spawn_group(self: &Arc<Self>, mappings: &[PodMapping], context: &str) -> MappingGroup {
        let source = CancelSource::new();
        let mut tasks = JoinSet::new();

        for mapping in mappings {
            let supervisor = Arc::clone(self);
            let mapping = mapping.clone();
            let context = context.to_string();
            let cancel = source.signal();
            tasks.spawn(async move {
                supervisor.run_mapping(&mapping, &context, cancel).await;
            });
        }

        MappingGroup {
            context: context.to_string(),
            source,
            tasks,
        }
    }
}

fn trace_state(mapping: &PodMapping, state: ForwardState) {
    debug!(local_port = mapping.local_port, state = state.as_str(), "Mapping state");
}

/// A set of mapping loops sharing one cancellation scope.
pub struct MappingGroup {
    context: String,
    source: CancelSource,
    tasks: JoinSet<()>,
}

impl MappingGroup {
    /// Context the group's dynamic mappings were started with.
    pub fn context(&self) -> &str {
        &self.context
    }

    /// Number of loops still running.
    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    /// Returns true if no loop is running.
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Cancels every loop and waits until all of them, and their tunnels, are gone.
    pub async fn shutdown(mut self) {
        self.source.cancel();
        while let Some(result) = self.tasks.join_next().await {
            if let Err(e) = result {
                warn!(error = %e, "Mapping task ended abnormally");
            }
        }
    }
}
