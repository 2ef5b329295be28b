//! Error types for the kubeforward-core library.

use thiserror::Error;

use crate::kubernetes::errors::KubectlError;

/// Result type alias for kubeforward operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading configuration or driving tunnels.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration is missing or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Kubernetes/kubectl error.
    #[error("Kubernetes error: {0}")]
    Kubernetes(#[from] KubectlError),
}
