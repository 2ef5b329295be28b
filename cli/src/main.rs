//! kubeforward CLI - Keep port-forward tunnels to Kubernetes pods alive
//!
//! Forwards local ports to pods named in a config file, restarting tunnels
//! when kubectl exits and following the current kubectl context.

mod commands;
mod logging;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "kubeforward")]
#[command(author, version, about = "Keep port-forward tunnels to Kubernetes pods alive")]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file (default: ~/.kubeforward/config.json)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// kubectl executable, overriding the config file
    #[arg(long, global = true)]
    kubectl: Option<PathBuf>,

    /// Log filter, e.g. `debug` or `kubeforward_core=trace` (default: RUST_LOG or info)
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Forward every configured mapping until interrupted
    Run,

    /// Show which pod each mapping resolves to right now
    Resolve {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Show current configuration
    Config {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::initialize_tracing(cli.log_level.as_deref());

    let options = commands::Options {
        config: cli.config,
        kubectl: cli.kubectl,
    };

    match cli.command {
        Some(Commands::Resolve { json }) => commands::resolve::run(&options, json).await?,
        Some(Commands::Config { json }) => commands::config::show(&options, json).await?,
        Some(Commands::Run) | None => commands::run::run(&options).await?,
    }

    Ok(())
}
