//! `parley` -- CLI binary for the parley platform layer.
//!
//! Provides the following subcommands:
//!
//! - `parley convert` -- Render an output template as a native response.
//! - `parley parse` -- Reconstruct an output template from a native response.
//! - `parley detect` -- Name the platform that recognizes a raw request.
//! - `parley config` -- Show the effective platform configuration.

use clap::{Parser, Subcommand};
use parley_plugin::Extensible;

mod commands;
mod host_config;

/// parley conversational platform CLI.
#[derive(Parser)]
#[command(name = "parley", about = "parley conversational platform CLI", version)]
struct Cli {
    /// Enable verbose (debug-level) logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Host config file (overrides `PARLEY_CONFIG`).
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Convert an output template to a platform's native response.
    Convert(commands::convert::ConvertArgs),

    /// Convert a native response back to an output template.
    Parse(commands::parse::ParseArgs),

    /// Find the platform that recognizes a raw request.
    Detect(commands::detect::DetectArgs),

    /// Show effective platform configuration.
    Config(commands::config_cmd::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .init();

    let host_config = host_config::load_host_config(cli.config.as_deref())?;
    let host = host_config.build_host().await?;

    run(host, cli.command).await
}

/// Run one subcommand, then shut the host down whether or not it succeeded.
async fn run(host: Extensible, command: Commands) -> anyhow::Result<()> {
    let result = match command {
        Commands::Convert(args) => commands::convert::run(&host, args),
        Commands::Parse(args) => commands::parse::run(&host, args),
        Commands::Detect(args) => commands::detect::run(&host, args),
        Commands::Config(args) => commands::config_cmd::run(&host, args),
    };

    for (name, outcome) in host.shutdown().await {
        if let Err(e) = outcome {
            tracing::warn!(plugin = %name, error = %e, "shutdown failed");
        }
    }

    result
}
