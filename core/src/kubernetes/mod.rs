//! Kubernetes module: the kubectl adapter behind [`crate::ports::ClusterGateway`].
//!
//! This module provides:
//! - Locating the kubectl binary
//! - Subprocess management for kubectl commands and port-forward tunnels
//! - Pod listing with a single-flight cache, current-context lookup

pub mod discovery;
pub mod errors;
pub mod gateway;
pub mod process_runner;

// Re-export commonly used types
pub use discovery::KubernetesDiscovery;
pub use errors::{KubectlError, Result};
pub use gateway::{parse_pod_names, KubectlGateway, POD_LIST_TTL};
pub use process_runner::{ProcessRunner, TunnelProcess};
