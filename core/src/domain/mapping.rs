//! Pod mapping domain model.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

use super::ForwardTarget;

/// Configured intent to forward a local port to a named pod's remote port.
///
/// Field aliases accept the PascalCase keys of `appsettings.json` style files.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PodMapping {
    /// Port listened on locally.
    #[serde(alias = "LocalPort")]
    pub local_port: u16,
    /// Port of the pod to forward to.
    #[serde(alias = "RemotePort")]
    pub remote_port: u16,
    /// Logical pod name, matched as a prefix of the runtime pod name.
    #[serde(alias = "Name")]
    pub name: String,
    /// Namespace of the pod. Empty means kubectl's default namespace.
    #[serde(default, alias = "Namespace")]
    pub namespace: String,
    /// Cluster context to use. Empty means "whatever context is current".
    #[serde(default, alias = "ClusterName")]
    pub cluster_name: String,
}

impl PodMapping {
    /// Create a new mapping.
    pub fn new(
        local_port: u16,
        remote_port: u16,
        name: impl Into<String>,
        namespace: impl Into<String>,
        cluster_name: impl Into<String>,
    ) -> Self {
        Self {
            local_port,
            remote_port,
            name: name.into(),
            namespace: namespace.into(),
            cluster_name: cluster_name.into(),
        }
    }

    /// A dynamic mapping follows the active context and restarts when it changes.
    pub fn is_dynamic(&self) -> bool {
        self.cluster_name.trim().is_empty()
    }

    /// The context to talk to: the pinned cluster, or `current` for dynamic mappings.
    pub fn effective_context<'a>(&'a self, current: &'a str) -> &'a str {
        if self.is_dynamic() {
            current
        } else {
            self.cluster_name.trim()
        }
    }

    /// Local side of the tunnel, e.g. `localhost:8080`.
    pub fn source(&self) -> String {
        format!("localhost:{}", self.local_port)
    }

    /// Builds the port-forward target for a resolved pod.
    pub fn target(&self, context: &str, pod: &str) -> ForwardTarget {
        ForwardTarget {
            context: context.to_string(),
            namespace: self.namespace.trim().to_string(),
            pod: pod.to_string(),
            local_port: self.local_port,
            remote_port: self.remote_port,
        }
    }

    /// Checks the mapping is usable.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::Config(format!(
                "Mapping for local port {} has no pod name",
                self.local_port
            )));
        }
        if self.local_port == 0 {
            return Err(Error::Config(format!(
                "Mapping for pod {} has local port 0",
                self.name
            )));
        }
        if self.remote_port == 0 {
            return Err(Error::Config(format!(
                "Mapping for pod {} has remote port 0",
                self.name
            )));
        }
        Ok(())
    }
}

impl std::fmt::Display for PodMapping {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let cluster = if self.is_dynamic() {
            "<current>"
        } else {
            self.cluster_name.as_str()
        };
        write!(
            f,
            "{} --> {}.{}.{}:{}",
            self.source(),
            cluster,
            self.namespace,
            self.name,
            self.remote_port
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dynamic_and_static() {
        let dynamic = PodMapping::new(8080, 80, "web", "default", "");
        assert!(dynamic.is_dynamic());
        assert_eq!(dynamic.effective_context("ctx-a"), "ctx-a");

        let blank = PodMapping::new(8080, 80, "web", "default", "  ");
        assert!(blank.is_dynamic());

        let pinned = PodMapping::new(8081, 80, "web", "default", "prod");
        assert!(!pinned.is_dynamic());
        assert_eq!(pinned.effective_context("ctx-a"), "prod");
    }

    #[test]
    fn test_target() {
        let mapping = PodMapping::new(8080, 80, "web", "default", "");
        let target = mapping.target("ctx-a", "web-abc123");
        assert_eq!(target.pod, "web-abc123");
        assert_eq!(target.context, "ctx-a");
        assert_eq!(target.namespace, "default");
        assert_eq!(target.local_port, 8080);
        assert_eq!(target.remote_port, 80);
    }

    #[test]
    fn test_validate() {
        assert!(PodMapping::new(8080, 80, "web", "", "").validate().is_ok());
        assert!(PodMapping::new(8080, 80, " ", "", "").validate().is_err());
        assert!(PodMapping::new(0, 80, "web", "", "").validate().is_err());
        assert!(PodMapping::new(8080, 0, "web", "", "").validate().is_err());
    }

    #[test]
    fn test_deserialize_pascal_case() {
        let json = r#"{"LocalPort": 5432, "RemotePort": 5432, "Name": "db", "Namespace": "data"}"#;
        let mapping: PodMapping = serde_json::from_str(json).unwrap();
        assert_eq!(mapping, PodMapping::new(5432, 5432, "db", "data", ""));
    }

    #[test]
    fn test_display() {
        let mapping = PodMapping::new(8080, 80, "web", "default", "prod");
        assert_eq!(mapping.to_string(), "localhost:8080 --> prod.default.web:80");
    }
}
