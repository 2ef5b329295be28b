//! Resolve command - show the pod each mapping would forward to.

use anyhow::Result;
use kubeforward_core::{ClusterGateway, PodMapping, PodResolver};
use serde::Serialize;

use super::Options;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Resolution<'a> {
    local_port: u16,
    remote_port: u16,
    name: &'a str,
    namespace: &'a str,
    context: String,
    pod: Option<String>,
}

pub async fn run(options: &Options, json: bool) -> Result<()> {
    let config = options.load_config().await?;
    let gateway = super::gateway(&config);
    let current = gateway.current_context().await.unwrap_or_default();
    let resolver = PodResolver::new(gateway);

    let mut resolutions = Vec::with_capacity(config.pods.len());
    for mapping in &config.pods {
        resolutions.push(resolve_one(&resolver, mapping, &current).await);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&resolutions)?);
        return Ok(());
    }

    if resolutions.is_empty() {
        println!("No pods configured.");
        return Ok(());
    }

    println!(
        "{:<7} {:<7} {:<20} {:<15} {:<20} POD",
        "LOCAL", "REMOTE", "NAME", "NAMESPACE", "CONTEXT"
    );
    println!("{}", "-".repeat(90));

    for r in &resolutions {
        println!(
            "{:<7} {:<7} {:<20} {:<15} {:<20} {}",
            r.local_port,
            r.remote_port,
            truncate(r.name, 20),
            truncate(or_dash(r.namespace), 15),
            truncate(or_dash(&r.context), 20),
            r.pod.as_deref().unwrap_or("-")
        );
    }

    let found = resolutions.iter().filter(|r| r.pod.is_some()).count();
    println!("\nResolved: {}/{}", found, resolutions.len());
    Ok(())
}

async fn resolve_one<'a, G: ClusterGateway>(
    resolver: &PodResolver<G>,
    mapping: &'a PodMapping,
    current: &str,
) -> Resolution<'a> {
    let context = mapping.effective_context(current).to_string();
    let pod = resolver.resolve(&context, mapping).await;
    Resolution {
        local_port: mapping.local_port,
        remote_port: mapping.remote_port,
        name: &mapping.name,
        namespace: &mapping.namespace,
        context,
        pod,
    }
}

fn or_dash(s: &str) -> &str {
    if s.trim().is_empty() {
        "-"
    } else {
        s
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(max - 1).collect();
        out.push('…');
        out
    }
}
