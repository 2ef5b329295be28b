//! Run command - forward every mapping until interrupted.

use anyhow::Result;
use kubeforward_core::{CancelSource, ForwardService};
use tracing::{info, warn};

use super::Options;

pub async fn run(options: &Options) -> Result<()> {
    let config = options.load_config().await?;
    if config.pods.is_empty() {
        warn!("No pods configured, nothing to forward");
        return Ok(());
    }

    for mapping in &config.pods {
        info!("Mapping {}", mapping);
    }

    let service = ForwardService::new(super::gateway(&config))
        .with_retry_backoff(config.retry_backoff())
        .with_poll_interval(config.poll_interval());

    let shutdown = CancelSource::new();
    let signal = shutdown.signal();
    tokio::spawn(async move {
        wait_for_termination().await;
        info!("Shutting down, stopping tunnels");
        shutdown.cancel();
    });

    service.run(&config.pods, signal).await;
    Ok(())
}

/// Completes on Ctrl-C, or SIGTERM on unix.
async fn wait_for_termination() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = terminate.recv() => {}
                }
                return;
            }
            Err(e) => warn!(error = %e, "Cannot listen for SIGTERM"),
        }
    }

    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Cannot listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}
