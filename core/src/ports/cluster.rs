//! Cluster gateway port (interface).

use crate::domain::ForwardTarget;
use crate::error::Result;

/// A live tunnel subprocess owned by exactly one mapping loop.
pub trait TunnelHandle: Send + 'static {
    /// OS process id, if the process has one.
    fn id(&self) -> Option<u32>;

    /// Wait for the tunnel to exit and return its exit code, if any.
    ///
    /// Must be cancel-safe: dropping the future leaves the tunnel running.
    fn wait(&mut self) -> impl std::future::Future<Output = Result<Option<i32>>> + Send;

    /// Terminate the tunnel and everything it spawned, then reap it.
    fn kill(&mut self) -> impl std::future::Future<Output = Result<()>> + Send;
}

/// Port for the cluster operations the supervisor depends on.
///
/// Implementations favor availability: listing pods and reading the context
/// never fail, absence is the signal.
pub trait ClusterGateway: Send + Sync + 'static {
    /// Tunnel type produced by [`ClusterGateway::start_port_forward`].
    type Tunnel: TunnelHandle;

    /// List pod names of `namespace` in `context`, in listing order.
    ///
    /// Returns an empty list when there are no pods or the lookup failed.
    fn list_pods(
        &self,
        context: &str,
        namespace: &str,
    ) -> impl std::future::Future<Output = Vec<String>> + Send;

    /// Read the active context. `None` if it could not be determined.
    fn current_context(&self) -> impl std::future::Future<Output = Option<String>> + Send;

    /// Spawn a tunnel for `target` without waiting for it.
    fn start_port_forward(&self, target: &ForwardTarget) -> Result<Self::Tunnel>;

    /// Drop every cached pod list of `context`.
    fn evict_pods(&self, context: &str);
}
