//! Port-forward target.

/// Fully resolved arguments of one `kubectl port-forward` invocation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ForwardTarget {
    /// Context passed as `--context`; empty uses kubectl's current context.
    pub context: String,
    /// Namespace passed as `--namespace`; empty uses kubectl's default.
    pub namespace: String,
    /// Runtime pod name.
    pub pod: String,
    pub local_port: u16,
    pub remote_port: u16,
}

impl ForwardTarget {
    /// Port pair argument, e.g. `8080:80`.
    pub fn port_pair(&self) -> String {
        format!("{}:{}", self.local_port, self.remote_port)
    }
}

impl std::fmt::Display for ForwardTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}.{}.{}:{}",
            self.context, self.namespace, self.pod, self.remote_port
        )
    }
}
