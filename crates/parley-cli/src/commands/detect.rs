//! `parley detect` -- name the platform that recognizes a raw request.
//!
//! Exits non-zero when no installed platform claims the request.

use clap::Args;
use tracing::debug;

use parley_plugin::Extensible;

use super::read_json;

/// Arguments for the `parley detect` subcommand.
#[derive(Args)]
pub struct DetectArgs {
    /// Raw request file.
    #[arg(long)]
    pub request: String,
}

pub fn run(host: &Extensible, args: DetectArgs) -> anyhow::Result<()> {
    let raw = read_json(&args.request)?;
    match host.find_platform_for_request(&raw) {
        Some(platform) => {
            debug!(platform = %platform.name(), type_tag = %platform.type_tag(), "request matched");
            println!("{}", platform.name());
            Ok(())
        }
        None => anyhow::bail!("no platform recognizes {}", args.request),
    }
}
