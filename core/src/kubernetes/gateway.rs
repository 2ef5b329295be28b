//! kubectl-backed implementation of [`ClusterGateway`].

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use super::discovery::KubernetesDiscovery;
use super::process_runner::{ProcessRunner, TunnelProcess};
use crate::cache::{Expiry, ResolutionCache};
use crate::domain::ForwardTarget;
use crate::error::Result;
use crate::ports::ClusterGateway;

/// How long a non-empty pod list is reused.
pub const POD_LIST_TTL: Duration = Duration::from_secs(60);

/// Cache key of a pod list: `(context, namespace)`.
type PodListKey = (String, String);

/// Talks to the cluster through the kubectl CLI.
pub struct KubectlGateway {
    runner: ProcessRunner,
    pods: ResolutionCache<PodListKey, Vec<String>>,
    // Contexts whose last pod listing could not reach the cluster.
    unreachable: Mutex<HashSet<String>>,
}

impl KubectlGateway {
    /// Creates a gateway driving `runner`.
    pub fn new(runner: ProcessRunner) -> Self {
        Self {
            runner,
            pods: ResolutionCache::new(),
            unreachable: Mutex::new(HashSet::new()),
        }
    }

    /// Creates a gateway using the kubectl found by `discovery`.
    pub fn from_discovery(discovery: &KubernetesDiscovery, base_args: Vec<String>) -> Self {
        Self::new(ProcessRunner::with_args(
            discovery.kubectl_path(),
            base_args,
        ))
    }

    async fn fetch_pods(&self, context: &str, namespace: &str) -> Vec<String> {
        let args = scoped_args(&["get", "pods"], context, namespace);
        match self.runner.output(&args).await {
            Ok(output) => {
                if self.unreachable.lock().remove(context) {
                    info!(context, "Cluster is reachable again");
                }
                parse_pod_names(&output)
            }
            Err(e) if e.is_cluster_not_connected() => {
                // Every mapping retries on its own; report an outage once.
                if self.unreachable.lock().insert(context.to_string()) {
                    warn!(context, namespace, error = %e, "Cluster is not reachable");
                } else {
                    debug!(context, namespace, "Cluster still not reachable");
                }
                Vec::new()
            }
            Err(e) => {
                warn!(context, namespace, error = %e, "Failed to list pods");
                Vec::new()
            }
        }
    }
}

impl ClusterGateway for KubectlGateway {
    type Tunnel = TunnelProcess;

    async fn list_pods(&self, context: &str, namespace: &str) -> Vec<String> {
        let key = (context.to_string(), namespace.to_string());
        let fetched = AtomicBool::new(false);
        let fetched_ref = &fetched;
        let pods = self
            .pods
            .get_or_create(key, move || async move {
                fetched_ref.store(true, Ordering::Relaxed);
                let pods = self.fetch_pods(context, namespace).await;
                debug!(context, namespace, count = pods.len(), "Fetched pod list");
                // An empty list is most likely a rollout in progress; don't keep it.
                let expiry = if pods.is_empty() {
                    Expiry::Now
                } else {
                    Expiry::After(POD_LIST_TTL)
                };
                (pods, expiry)
            })
            .await;

        if !fetched.load(Ordering::Relaxed) {
            debug!(context, namespace, count = pods.len(), "Pod list served from cache");
        }
        pods
    }

    async fn current_context(&self) -> Option<String> {
        let args = vec!["config".to_string(), "current-context".to_string()];
        match self.runner.output(&args).await {
            Ok(output) => {
                let context = output.trim();
                (!context.is_empty()).then(|| context.to_string())
            }
            Err(e) => {
                warn!(error = %e, "Failed to read current context");
                None
            }
        }
    }

    fn start_port_forward(&self, target: &ForwardTarget) -> Result<TunnelProcess> {
        let mut args = scoped_args(&["port-forward"], &target.context, &target.namespace);
        args.push(target.pod.clone());
        args.push(target.port_pair());
        Ok(self.runner.spawn(&args)?)
    }

    fn evict_pods(&self, context: &str) {
        self.pods.remove_where(|(cached, _)| cached == context);
    }
}

/// Builds `verb... [--context=C] [--namespace=N]`, omitting empty scopes.
fn scoped_args(verb: &[&str], context: &str, namespace: &str) -> Vec<String> {
    let mut args: Vec<String> = verb.iter().map(|s| s.to_string()).collect();
    if !context.trim().is_empty() {
        args.push(format!("--context={}", context.trim()));
    }
    if !namespace.trim().is_empty() {
        args.push(format!("--namespace={}", namespace.trim()));
    }
    args
}

/// Parses `kubectl get pods` table output into pod names.
///
/// The first line is the header; each following line contributes its first column.
pub fn parse_pod_names(output: &str) -> Vec<String> {
    output
        .lines()
        .filter(|line| !line.trim().is_empty())
        .skip(1)
        .filter_map(|line| line.split_whitespace().next())
        .map(str::to_string)
        .collect()
}
