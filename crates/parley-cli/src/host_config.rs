//! Host configuration: which platforms the CLI installs.
//!
//! The file is JSON, or YAML when the path ends in `.yaml`/`.yml`:
//!
//! ```text
//! platforms:
//!   - platform: dialogflow
//!     config:
//!       output:
//!         limits:
//!           quickRepliesMaxSize: 10
//!   - platform: core
//!     name: Kiosk
//!     type: kiosk-v1
//! ```
//!
//! Discovery: `--config <path>`, then the `PARLEY_CONFIG` environment
//! variable. Without either, or when `PARLEY_CONFIG` names a missing file,
//! the stock platform set is used.

use std::path::Path;

use anyhow::Context;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

use parley_platforms::{
    CorePlatformFactory, DialogflowPlatformFactory, PlatformDescriptor, PlatformKind,
    default_platforms, make_platform,
};
use parley_plugin::{Extensible, PluginDefinition};

/// Environment variable naming the host config file.
pub const CONFIG_ENV: &str = "PARLEY_CONFIG";

/// Platform kinds the CLI can install.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformChoice {
    Core,
    Dialogflow,
}

/// One platform to install.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PlatformEntry {
    pub platform: PlatformChoice,
    /// Identity; defaults to the kind's name.
    #[serde(default)]
    pub name: Option<String>,
    /// Type tag; defaults to the kind's tag.
    #[serde(default, rename = "type")]
    pub type_tag: Option<String>,
    /// Partial override of the platform's default config.
    #[serde(default)]
    pub config: Option<Value>,
}

impl PlatformEntry {
    fn descriptor<K: PlatformKind>(&self) -> PlatformDescriptor {
        make_platform(
            self.name.as_deref().unwrap_or(K::NAME),
            self.type_tag.as_deref().unwrap_or(K::DEFAULT_TYPE_TAG),
        )
    }

    pub fn definition(&self) -> PluginDefinition {
        let definition = match self.platform {
            PlatformChoice::Core => CorePlatformFactory::from_descriptor(
                self.descriptor::<parley_platforms::Core>(),
            )
            .definition(),
            PlatformChoice::Dialogflow => DialogflowPlatformFactory::from_descriptor(
                self.descriptor::<parley_platforms::Dialogflow>(),
            )
            .definition(),
        };
        match &self.config {
            Some(config) => definition.with_config(config.clone()),
            None => definition,
        }
    }
}

/// The CLI host configuration. An empty platform list means the stock set.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct HostConfig {
    #[serde(default)]
    pub platforms: Vec<PlatformEntry>,
}

impl HostConfig {
    pub fn definitions(&self) -> Vec<PluginDefinition> {
        if self.platforms.is_empty() {
            return default_platforms();
        }
        self.platforms.iter().map(PlatformEntry::definition).collect()
    }

    /// Install every configured platform into a fresh host.
    pub async fn build_host(&self) -> anyhow::Result<Extensible> {
        let mut host = Extensible::new("parley");
        host.install_all(self.definitions())
            .await
            .context("failed to install platforms")?;
        info!(platforms = ?host.names(), "host ready");
        Ok(host)
    }
}

/// Parse host config text; `yaml` selects the YAML parser.
pub fn parse_host_config(contents: &str, yaml: bool) -> anyhow::Result<HostConfig> {
    let config = if yaml {
        serde_yaml::from_str(contents)?
    } else {
        serde_json::from_str(contents)?
    };
    Ok(config)
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml" | "yml")
    )
}

fn read_host_config(path: &Path) -> anyhow::Result<HostConfig> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    parse_host_config(&contents, is_yaml(path))
        .with_context(|| format!("failed to parse config: {}", path.display()))
}

/// Load the host config from the override path or `PARLEY_CONFIG`.
///
/// An explicit `--config` path must exist.
pub fn load_host_config(config_override: Option<&str>) -> anyhow::Result<HostConfig> {
    if let Some(path_str) = config_override {
        let path = Path::new(path_str);
        if !path.exists() {
            anyhow::bail!("config file not found: {path_str}");
        }
        return read_host_config(path);
    }

    match std::env::var(CONFIG_ENV) {
        Ok(env_path) if Path::new(&env_path).exists() => read_host_config(Path::new(&env_path)),
        Ok(env_path) => {
            debug!(path = %env_path, "config file not found, using defaults");
            Ok(HostConfig::default())
        }
        Err(_) => {
            debug!("no config file given, using defaults");
            Ok(HostConfig::default())
        }
    }
}
