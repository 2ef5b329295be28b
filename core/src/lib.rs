//! kubeforward Core Library
//!
//! Keeps `kubectl port-forward` tunnels to Kubernetes pods alive.
//! Provides functionality to:
//! - Resolve logical pod names to live pods (last prefix match wins)
//! - Restart tunnels whenever kubectl exits
//! - Follow the current kubectl context for mappings not pinned to a cluster
//! - Share pod listings between mappings through a single-flight cache
//!
//! # Architecture
//! This library follows hexagonal architecture (ports & adapters):
//! - `domain`: Pure data models
//! - `ports`: Trait definitions (interfaces)
//! - `kubernetes`: kubectl-backed implementation of the ports
//! - `application`: Use case services

// Hexagonal architecture layers
pub mod application;
pub mod domain;
pub mod kubernetes;
pub mod ports;

pub mod cache;
pub mod config;
pub mod error;

// Re-export domain types (primary API)
pub use domain::{ForwardTarget, PodMapping};

// Re-export other commonly used types
pub use application::{CancelSignal, CancelSource, ForwardService, PodResolver};
pub use cache::{Expiry, ResolutionCache};
pub use config::{ConfigStore, ForwarderConfig};
pub use error::{Error, Result};
pub use kubernetes::{KubectlGateway, KubernetesDiscovery};
pub use ports::{ClusterGateway, TunnelHandle};
