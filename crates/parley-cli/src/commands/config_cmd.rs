//! `parley config` -- display effective platform configuration.
//!
//! Prints every installed platform's effective config keyed by identity,
//! or one platform's config with `--platform`.
//!
//! # Examples
//!
//! ```text
//! parley config
//! parley config --platform Dialogflow
//! ```

use clap::Args;
use serde_json::{Map, Value};

use parley_plugin::Extensible;

use super::{named_platform, print_json};

/// Arguments for the `parley config` subcommand.
#[derive(Args)]
pub struct ConfigArgs {
    /// Show only this platform.
    #[arg(long)]
    pub platform: Option<String>,
}

/// Effective configs of every platform in the host, keyed by identity.
pub fn effective_configs(host: &Extensible) -> Value {
    let configs: Map<String, Value> = host
        .platforms()
        .into_iter()
        .map(|p| (p.name().to_owned(), p.config()))
        .collect();
    Value::Object(configs)
}

pub fn run(host: &Extensible, args: ConfigArgs) -> anyhow::Result<()> {
    match &args.platform {
        Some(name) => print_json(&named_platform(host, name)?.config()),
        None => print_json(&effective_configs(host)),
    }
}
