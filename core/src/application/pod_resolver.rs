//! Resolving a mapping's logical pod name to the current runtime pod.

use std::sync::Arc;

use crate::domain::PodMapping;
use crate::ports::ClusterGateway;

/// Resolves logical pod names against the cluster's pod listing.
pub struct PodResolver<G: ClusterGateway> {
    gateway: Arc<G>,
}

impl<G: ClusterGateway> PodResolver<G> {
    /// Create a new resolver over the given gateway.
    pub fn new(gateway: Arc<G>) -> Self {
        Self { gateway }
    }

    /// Returns the pod `mapping` should forward to in `context`, if any.
    pub async fn resolve(&self, context: &str, mapping: &PodMapping) -> Option<String> {
        let pods = self
            .gateway
            .list_pods(context, mapping.namespace.trim())
            .await;
        select_pod(&pods, &mapping.name).map(str::to_string)
    }
}

/// Picks the last pod whose name starts with `name` (an exact match included).
///
/// During a rolling replacement the newest-listed instance wins over stale ones.
pub fn select_pod<'a>(pods: &'a [String], name: &str) -> Option<&'a str> {
    let name = name.trim();
    pods.iter()
        .rev()
        .find(|pod| pod.starts_with(name))
        .map(String::as_str)
}
