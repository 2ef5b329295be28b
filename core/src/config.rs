//! Forwarder configuration.
//!
//! Stored as JSON at `~/.kubeforward/config.json`. Keys are camelCase; the
//! PascalCase keys of `appsettings.json` style files are accepted as well.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::domain::PodMapping;
use crate::error::{Error, Result};

/// Configuration data stored in JSON format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForwarderConfig {
    /// Mappings to keep forwarded.
    #[serde(default, alias = "Pods")]
    pub pods: Vec<PodMapping>,

    /// kubectl executable. Searched for when absent.
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "KubectlPath")]
    pub kubectl_path: Option<PathBuf>,

    /// Arguments placed before every kubectl invocation.
    #[serde(default, skip_serializing_if = "Vec::is_empty", alias = "KubectlArgs")]
    pub kubectl_args: Vec<String>,

    /// Interval between current-context reads, in milliseconds.
    #[serde(default = "default_context_poll_interval_ms", alias = "ContextPollIntervalMs")]
    pub context_poll_interval_ms: u64,

    /// Delay before a mapping retries, in milliseconds.
    #[serde(default = "default_retry_backoff_ms", alias = "RetryBackoffMs")]
    pub retry_backoff_ms: u64,
}

fn default_context_poll_interval_ms() -> u64 {
    1_000
}

fn default_retry_backoff_ms() -> u64 {
    500
}

impl Default for ForwarderConfig {
    fn default() -> Self {
        Self {
            pods: Vec::new(),
            kubectl_path: None,
            kubectl_args: Vec::new(),
            context_poll_interval_ms: default_context_poll_interval_ms(),
            retry_backoff_ms: default_retry_backoff_ms(),
        }
    }
}

impl ForwarderConfig {
    /// Checks every mapping and rejects local ports claimed twice.
    pub fn validate(&self) -> Result<()> {
        let mut claimed: HashMap<u16, &str> = HashMap::new();
        for mapping in &self.pods {
            mapping.validate()?;
            if let Some(previous) = claimed.insert(mapping.local_port, &mapping.name) {
                return Err(Error::Config(format!(
                    "Local port {} is used by both {} and {}",
                    mapping.local_port, previous, mapping.name
                )));
            }
        }

        if self.context_poll_interval_ms == 0 {
            return Err(Error::Config(
                "contextPollIntervalMs must be greater than 0".to_string(),
            ));
        }
        if self.retry_backoff_ms == 0 {
            return Err(Error::Config(
                "retryBackoffMs must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.context_poll_interval_ms)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    /// Mappings following the current context.
    pub fn dynamic_mappings(&self) -> impl Iterator<Item = &PodMapping> {
        self.pods.iter().filter(|m| m.is_dynamic())
    }

    /// Mappings pinned to a cluster.
    pub fn static_mappings(&self) -> impl Iterator<Item = &PodMapping> {
        self.pods.iter().filter(|m| !m.is_dynamic())
    }
}

/// Loads [`ForwarderConfig`] from disk.
pub struct ConfigStore {
    config_path: PathBuf,
}

impl ConfigStore {
    /// Create a new config store with the default path.
    ///
    /// Default path: `~/.kubeforward/config.json`
    pub fn new() -> Result<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| Error::Config("Could not determine home directory".to_string()))?;

        Ok(Self {
            config_path: home.join(".kubeforward").join("config.json"),
        })
    }

    /// Create a config store with a custom path.
    pub fn with_path(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Load and validate configuration from disk.
    ///
    /// Unlike most settings files a missing file is an error: without
    /// mappings there is nothing to do.
    pub async fn load(&self) -> Result<ForwarderConfig> {
        let content = fs::read_to_string(&self.config_path).await.map_err(|e| {
            Error::Config(format!(
                "Failed to read config {}: {}",
                self.config_path.display(),
                e
            ))
        })?;

        let config: ForwarderConfig = serde_json::from_str(&content).map_err(|e| {
            Error::Config(format!(
                "Failed to parse config {}: {}",
                self.config_path.display(),
                e
            ))
        })?;

        config.validate()?;
        Ok(config)
    }
}
