//! Config command - show the loaded configuration.

use anyhow::Result;

use super::Options;

pub async fn show(options: &Options, json: bool) -> Result<()> {
    let config = options.load_config().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    println!("Configuration:");
    match &config.kubectl_path {
        Some(path) => println!("  kubectl: {}", path.display()),
        None => println!("  kubectl: (searched)"),
    }
    if !config.kubectl_args.is_empty() {
        println!("  kubectl args: {}", config.kubectl_args.join(" "));
    }
    println!("  Context poll interval: {}ms", config.context_poll_interval_ms);
    println!("  Retry backoff: {}ms", config.retry_backoff_ms);

    println!(
        "\n  Following current context: {}",
        config.dynamic_mappings().count()
    );
    for mapping in config.dynamic_mappings() {
        println!("    {}", mapping);
    }

    println!("\n  Pinned to a cluster: {}", config.static_mappings().count());
    for mapping in config.static_mappings() {
        println!("    {}", mapping);
    }

    Ok(())
}
