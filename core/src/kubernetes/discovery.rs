//! Locating the kubectl binary.

use std::path::{Path, PathBuf};

/// Default paths to search for kubectl.
const KUBECTL_PATHS: &[&str] = &[
    "/opt/homebrew/bin/kubectl", // Apple Silicon
    "/usr/local/bin/kubectl",    // Intel Mac / Homebrew
    "/usr/bin/kubectl",          // System
    "/snap/bin/kubectl",         // Snap
];

/// Name looked up on `PATH` when no known location exists.
const KUBECTL_FALLBACK: &str = "kubectl";

/// Kubernetes discovery service.
#[derive(Debug, Clone)]
pub struct KubernetesDiscovery {
    kubectl_path: PathBuf,
}

impl KubernetesDiscovery {
    /// Creates a new KubernetesDiscovery, searching the well-known locations.
    pub fn new() -> Self {
        Self {
            kubectl_path: find_executable(KUBECTL_PATHS)
                .unwrap_or_else(|| PathBuf::from(KUBECTL_FALLBACK)),
        }
    }

    /// Uses `configured` when given, otherwise searches like [`KubernetesDiscovery::new`].
    pub fn with_path(configured: Option<PathBuf>) -> Self {
        match configured {
            Some(kubectl_path) => Self { kubectl_path },
            None => Self::new(),
        }
    }

    /// Returns the kubectl path.
    pub fn kubectl_path(&self) -> &Path {
        &self.kubectl_path
    }

    /// Returns true if kubectl was found at an explicit location.
    ///
    /// A bare `kubectl` fallback is resolved by the OS at spawn time and is not checked.
    pub fn is_kubectl_available(&self) -> bool {
        self.kubectl_path.as_os_str() == KUBECTL_FALLBACK || self.kubectl_path.exists()
    }
}

impl Default for KubernetesDiscovery {
    fn default() -> Self {
        Self::new()
    }
}

/// Finds an executable in the given paths.
fn find_executable(paths: &[&str]) -> Option<PathBuf> {
    paths
        .iter()
        .map(PathBuf::from)
        .find(|path_buf| path_buf.exists())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kubernetes_discovery_creation() {
        let discovery = KubernetesDiscovery::new();
        assert!(discovery.is_kubectl_available());
        assert!(!discovery.kubectl_path().as_os_str().is_empty());
    }

    #[test]
    fn test_configured_path_wins() {
        let discovery = KubernetesDiscovery::with_path(Some(PathBuf::from("/opt/k8s/kubectl")));
        assert_eq!(discovery.kubectl_path(), Path::new("/opt/k8s/kubectl"));
        assert!(!discovery.is_kubectl_available());
    }

    #[test]
    fn test_find_executable() {
        // Test with a path that should exist on most systems
        let result = find_executable(&["/nonexistent/path", "/bin/sh"]);
        assert_eq!(result, Some(PathBuf::from("/bin/sh")));

        // Test with a path that shouldn't exist
        let result = find_executable(&["/nonexistent/path"]);
        assert!(result.is_none());
    }
}
