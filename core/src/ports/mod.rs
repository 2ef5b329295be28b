//! Ports layer - Trait definitions (interfaces).
//!
//! This module defines the interfaces that the application layer uses
//! to interact with external systems. Implementations live in `kubernetes`.

mod cluster;

pub use cluster::{ClusterGateway, TunnelHandle};
