//! Error types for kubectl interaction.

use thiserror::Error;

/// Result type alias for kubectl operations.
pub type Result<T> = std::result::Result<T, KubectlError>;

/// Errors that can occur while driving kubectl.
#[derive(Error, Debug)]
pub enum KubectlError {
    /// kubectl could not be located.
    #[error("kubectl not found")]
    KubectlNotFound,

    /// kubectl exited with a non-zero status.
    #[error("kubectl {args} failed: {stderr}")]
    CommandFailed { args: String, stderr: String },

    /// kubectl output could not be parsed.
    #[error("Failed to parse kubectl output: {0}")]
    ParsingFailed(String),

    /// A subprocess could not be started or signalled.
    #[error("Process error: {0}")]
    ProcessError(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl KubectlError {
    /// Builds a `CommandFailed` from the arguments and raw stderr of a run.
    pub fn command_failed(args: &[String], stderr: &[u8]) -> Self {
        Self::CommandFailed {
            args: args.join(" "),
            stderr: String::from_utf8_lossy(stderr).trim().to_string(),
        }
    }

    /// Returns true if the failure means the cluster is unreachable or unconfigured.
    pub fn is_cluster_not_connected(&self) -> bool {
        let Self::CommandFailed { stderr, .. } = self else {
            return false;
        };
        let stderr = stderr.to_lowercase();
        stderr.contains("connection refused")
            || stderr.contains("no configuration has been provided")
            || stderr.contains("current-context is not set")
            || stderr.contains("dial tcp")
    }
}
