//! CLI command implementations.

pub mod config;
pub mod resolve;
pub mod run;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use kubeforward_core::{ConfigStore, ForwarderConfig, KubectlGateway, KubernetesDiscovery};
use tracing::{debug, warn};

/// Options shared by every command.
pub struct Options {
    pub config: Option<PathBuf>,
    pub kubectl: Option<PathBuf>,
}

impl Options {
    fn store(&self) -> Result<ConfigStore> {
        match &self.config {
            Some(path) => Ok(ConfigStore::with_path(path.clone())),
            None => Ok(ConfigStore::new()?),
        }
    }

    /// Loads the config file, applying command-line overrides.
    pub async fn load_config(&self) -> Result<ForwarderConfig> {
        let store = self.store()?;
        let mut config = store
            .load()
            .await
            .with_context(|| format!("Cannot load {}", store.config_path().display()))?;

        if let Some(kubectl) = &self.kubectl {
            config.kubectl_path = Some(kubectl.clone());
        }
        debug!(path = %store.config_path().display(), mappings = config.pods.len(), "Loaded config");
        Ok(config)
    }
}

/// Builds the kubectl gateway described by `config`.
pub fn gateway(config: &ForwarderConfig) -> Arc<KubectlGateway> {
    let discovery = KubernetesDiscovery::with_path(config.kubectl_path.clone());
    if !discovery.is_kubectl_available() {
        warn!(path = %discovery.kubectl_path().display(), "kubectl not found");
    }
    Arc::new(KubectlGateway::from_discovery(
        &discovery,
        config.kubectl_args.clone(),
    ))
}
