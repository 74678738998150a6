//! CLI command implementations for `parley`.
//!
//! - [`convert`] -- output template to native response.
//! - [`parse`] -- native response to output template.
//! - [`detect`] -- request routing.
//! - [`config_cmd`] -- effective configuration.

pub mod config_cmd;
pub mod convert;
pub mod detect;
pub mod parse;

use std::path::Path;

use anyhow::Context;
use serde::Serialize;
use serde_json::Value;

use parley_plugin::{Extensible, Platform};

/// Read a JSON document from `path`.
pub fn read_json(path: &str) -> anyhow::Result<Value> {
    let contents = std::fs::read_to_string(Path::new(path))
        .with_context(|| format!("failed to read {path}"))?;
    serde_json::from_str(&contents).with_context(|| format!("failed to parse {path}"))
}

/// The installed platform named `name`, listing the installed ones if
/// there is none.
pub fn named_platform<'a>(host: &'a Extensible, name: &str) -> anyhow::Result<&'a dyn Platform> {
    host.platform(name).ok_or_else(|| {
        let available: Vec<_> = host.platforms().iter().map(|p| p.name().to_owned()).collect();
        anyhow::anyhow!(
            "unknown platform '{name}' (installed: {})",
            available.join(", ")
        )
    })
}

/// Print `value` as pretty JSON on stdout.
pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
