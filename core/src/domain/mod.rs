//! Domain layer - Pure business logic and data models.
//!
//! This module contains domain entities that represent core business concepts.
//! These types have no I/O dependencies and can be tested in isolation.

mod mapping;
mod target;

// Re-export all domain types
pub use mapping::PodMapping;
pub use target::ForwardTarget;
