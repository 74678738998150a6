//! `parley parse` -- reconstruct an output template from a native response.
//!
//! Without `--platform`, the response is handed to the first platform that
//! recognizes it as its own.

use clap::Args;

use parley_plugin::{Extensible, Platform};

use super::{named_platform, print_json, read_json};

/// Arguments for the `parley parse` subcommand.
#[derive(Args)]
pub struct ParseArgs {
    /// Native response file.
    #[arg(long)]
    pub response: String,

    /// Platform identity; detected from the response when omitted.
    #[arg(long)]
    pub platform: Option<String>,
}

pub fn run(host: &Extensible, args: ParseArgs) -> anyhow::Result<()> {
    let raw = read_json(&args.response)?;

    let platform: &dyn Platform = match &args.platform {
        Some(name) => named_platform(host, name)?,
        None => host
            .find_platform_for_response(&raw)
            .ok_or_else(|| anyhow::anyhow!("no platform recognizes {}", args.response))?,
    };

    let output = platform.parse_response(&raw)?;
    print_json(&output)
}
