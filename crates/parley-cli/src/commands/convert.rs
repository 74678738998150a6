//! `parley convert` -- render an output template as a native response.
//!
//! The output file holds one template or an array of templates produced for
//! the same turn; an array is merged before conversion. Sanitization
//! warnings are logged, the finalized response goes to stdout.
//!
//! # Example
//!
//! ```text
//! parley convert --output reply.json --platform Dialogflow --session state.json
//! ```

use anyhow::Context;
use clap::Args;
use serde_json::Value;
use tracing::info;

use parley_plugin::{Extensible, Platform};
use parley_types::{AppState, OutputTemplate};

use super::{named_platform, print_json, read_json};

/// Arguments for the `parley convert` subcommand.
#[derive(Args)]
pub struct ConvertArgs {
    /// Output template file (object or array of objects).
    #[arg(long)]
    pub output: String,

    /// Platform identity; defaults to the first installed platform.
    #[arg(long)]
    pub platform: Option<String>,

    /// Application state file (`{"session": {...}, "end_session": bool}`).
    #[arg(long)]
    pub session: Option<String>,
}

/// Templates in an output document.
pub fn templates(raw: Value) -> anyhow::Result<Vec<OutputTemplate>> {
    let templates = match raw {
        Value::Array(items) => items
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<_>, _>>()?,
        other => vec![serde_json::from_value(other)?],
    };
    Ok(templates)
}

pub fn run(host: &Extensible, args: ConvertArgs) -> anyhow::Result<()> {
    let outputs = templates(read_json(&args.output)?)
        .with_context(|| format!("{} is not an output template", args.output))?;

    let state: AppState = match &args.session {
        Some(path) => serde_json::from_value(read_json(path)?)
            .with_context(|| format!("{path} is not an application state"))?,
        None => AppState::default(),
    };

    let platform: &dyn Platform = match &args.platform {
        Some(name) => named_platform(host, name)?,
        None => host
            .platforms()
            .into_iter()
            .next()
            .ok_or_else(|| anyhow::anyhow!("no platform installed"))?,
    };

    let conversion = platform.respond(&outputs, &state)?;
    info!(
        platform = %platform.name(),
        warnings = conversion.warnings.len(),
        "output converted"
    );
    print_json(&conversion.response)
}
