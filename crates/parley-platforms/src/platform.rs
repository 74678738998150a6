//! The generic platform plugin.
//!
//! A [`PlatformPlugin<K>`] is a plugin node for platform kind `K`. It owns
//! the kind's converter strategy, built from the node's effective
//! configuration, and child plugins of its own. New platforms are added by
//! implementing [`PlatformKind`], not by subclassing.
//!
//! Named variants of a kind (the same platform recognizing a different type
//! tag) are plain data: [`make_platform`] returns a [`PlatformDescriptor`]
//! that [`PlatformFactory::from_descriptor`] turns into a factory.

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use parley_plugin::config::from_effective;
use parley_plugin::{Extensible, Platform, Plugin, PluginDefinition, PluginError, PluginFactory};
use parley_types::{AppState, Conversion, ConversionError, OutputTemplate};

use crate::converter::{ConverterConfig, OutputConverterStrategy, finalize_response};
use crate::sanitize::{SanitizationConfig, SanitizationLimits};

/// The native response type of platform kind `K`.
pub type ResponseOf<K> = <<K as PlatformKind>::Strategy as OutputConverterStrategy>::Response;

/// Static description of one platform kind.
pub trait PlatformKind: Send + Sync + 'static {
    /// Default identity, also the key of the kind's override block.
    const NAME: &'static str;

    /// Type tag used when none is configured.
    const DEFAULT_TYPE_TAG: &'static str;

    /// Typed inbound request.
    type Request: DeserializeOwned + Serialize + Send + Sync;

    type Strategy: OutputConverterStrategy;

    /// Ceilings applied when the configuration does not set them.
    fn default_limits() -> SanitizationLimits;

    fn strategy(config: ConverterConfig) -> Self::Strategy;

    /// Whether `raw` is a request for a platform configured with `type_tag`.
    fn is_request(raw: &Value, type_tag: &str) -> bool;

    /// Whether `raw` is a response produced by a platform configured with
    /// `type_tag`.
    fn is_response(raw: &Value, type_tag: &str) -> bool;
}

/// Effective configuration of a platform plugin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformConfig {
    /// Type tag stamped into responses and matched by the predicates.
    #[serde(rename = "type")]
    pub type_tag: String,
    #[serde(default)]
    pub output: ConverterConfig,
}

impl PlatformConfig {
    /// Defaults for kind `K` with the given type tag.
    pub fn defaults<K: PlatformKind>(type_tag: impl Into<String>) -> Self {
        Self {
            type_tag: type_tag.into(),
            output: ConverterConfig {
                sanitization: SanitizationConfig::default(),
                limits: K::default_limits(),
            },
        }
    }
}

/// A plugin node that converts output for platform kind `K`.
pub struct PlatformPlugin<K: PlatformKind> {
    name: String,
    config: PlatformConfig,
    strategy: K::Strategy,
    children: Extensible,
}

impl<K: PlatformKind> PlatformPlugin<K> {
    /// Build from an already merged configuration value.
    pub fn from_config(name: &str, config: Value) -> Result<Self, PluginError> {
        let config: PlatformConfig = from_effective(name, config)?;
        Ok(Self::new(name, config))
    }

    pub fn new(name: impl Into<String>, config: PlatformConfig) -> Self {
        let name = name.into();
        Self {
            strategy: K::strategy(config.output),
            children: Extensible::new(name.clone()),
            name,
            config,
        }
    }

    pub fn strategy(&self) -> &K::Strategy {
        &self.strategy
    }

    pub fn platform_config(&self) -> &PlatformConfig {
        &self.config
    }

    /// Parse a raw payload as this platform's request type.
    pub fn parse_request(&self, raw: &Value) -> Result<K::Request, ConversionError> {
        Ok(<K::Request as Deserialize>::deserialize(raw)?)
    }

    /// Typed counterpart of [`Platform::respond`].
    pub fn convert(
        &self,
        outputs: &[OutputTemplate],
        state: &AppState,
    ) -> Conversion<ResponseOf<K>> {
        let output = self.strategy.prepare_output(outputs);
        self.strategy
            .convert(&output)
            .map(|response| self.finalize_response(response, state))
    }

    /// Stamp this platform's type tag and `state`'s session onto `response`.
    pub fn finalize_response(&self, response: ResponseOf<K>, state: &AppState) -> ResponseOf<K> {
        finalize_response(response, &self.config.type_tag, state)
    }

    /// Typed counterpart of [`Platform::parse_response`].
    pub fn from_response(&self, response: &ResponseOf<K>) -> OutputTemplate {
        self.strategy.from_response(response)
    }
}

#[async_trait]
impl<K: PlatformKind> Plugin for PlatformPlugin<K> {
    fn name(&self) -> &str {
        &self.name
    }

    fn config(&self) -> Value {
        serde_json::to_value(&self.config).unwrap_or_default()
    }

    fn extensible(&self) -> Option<&Extensible> {
        Some(&self.children)
    }

    fn extensible_mut(&mut self) -> Option<&mut Extensible> {
        Some(&mut self.children)
    }

    fn as_platform(&self) -> Option<&dyn Platform> {
        Some(self)
    }

    async fn install(&mut self, parent: &mut Extensible) -> Result<(), PluginError> {
        if self.config.type_tag.trim().is_empty() {
            return Err(PluginError::ExecutionFailed(format!(
                "platform {} has an empty type tag",
                self.name
            )));
        }
        info!(
            platform = %self.name,
            kind = K::NAME,
            type_tag = %self.config.type_tag,
            parent = %parent.name(),
            "platform registered"
        );
        Ok(())
    }

    async fn uninstall(&mut self, _parent: Option<&mut Extensible>) -> Result<(), PluginError> {
        debug!(platform = %self.name, "platform unregistered");
        Ok(())
    }
}

impl<K: PlatformKind> Platform for PlatformPlugin<K> {
    fn platform_name(&self) -> &str {
        self.strategy.platform_name()
    }

    fn type_tag(&self) -> &str {
        &self.config.type_tag
    }

    fn is_request_related(&self, raw: &Value) -> bool {
        let related = K::is_request(raw, &self.config.type_tag);
        debug!(platform = %self.name, related, "request check");
        related
    }

    fn is_response_related(&self, raw: &Value) -> bool {
        K::is_response(raw, &self.config.type_tag)
    }

    fn respond(
        &self,
        outputs: &[OutputTemplate],
        state: &AppState,
    ) -> Result<Conversion<Value>, ConversionError> {
        Ok(self.convert(outputs, state).try_map(serde_json::to_value)?)
    }

    fn parse_response(&self, raw: &Value) -> Result<OutputTemplate, ConversionError> {
        let response = <ResponseOf<K> as Deserialize>::deserialize(raw)?;
        Ok(self.from_response(&response))
    }
}

// ---------------------------------------------------------------------------
// Descriptors and factories
// ---------------------------------------------------------------------------

/// A named platform variant: identity plus default type tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlatformDescriptor {
    pub name: String,
    #[serde(rename = "type")]
    pub type_tag: String,
}

/// Describe a platform named `name` that defaults to `type_tag`.
pub fn make_platform(name: impl Into<String>, type_tag: impl Into<String>) -> PlatformDescriptor {
    PlatformDescriptor {
        name: name.into(),
        type_tag: type_tag.into(),
    }
}

/// Builds [`PlatformPlugin<K>`] nodes.
pub struct PlatformFactory<K> {
    descriptor: PlatformDescriptor,
    _kind: PhantomData<fn() -> K>,
}

impl<K: PlatformKind> PlatformFactory<K> {
    /// Factory for the kind's default identity and type tag.
    pub fn new() -> Self {
        Self::from_descriptor(make_platform(K::NAME, K::DEFAULT_TYPE_TAG))
    }

    pub fn from_descriptor(descriptor: PlatformDescriptor) -> Self {
        Self {
            descriptor,
            _kind: PhantomData,
        }
    }

    pub fn descriptor(&self) -> &PlatformDescriptor {
        &self.descriptor
    }

    /// Wrap this factory in a definition with no override.
    pub fn definition(self) -> PluginDefinition {
        PluginDefinition::new(Arc::new(self))
    }
}

impl<K: PlatformKind> Default for PlatformFactory<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: PlatformKind> PluginFactory for PlatformFactory<K> {
    fn plugin_name(&self) -> &str {
        &self.descriptor.name
    }

    fn default_config(&self) -> Value {
        serde_json::to_value(PlatformConfig::defaults::<K>(&self.descriptor.type_tag))
            .unwrap_or_default()
    }

    fn build(&self, name: &str, config: Value) -> Result<Box<dyn Plugin>, PluginError> {
        Ok(Box::new(PlatformPlugin::<K>::from_config(name, config)?))
    }
}

impl<K: PlatformKind> From<PlatformFactory<K>> for PluginDefinition {
    fn from(factory: PlatformFactory<K>) -> Self {
        factory.definition()
    }
}

impl<K: PlatformKind> From<PlatformDescriptor> for PlatformFactory<K> {
    fn from(descriptor: PlatformDescriptor) -> Self {
        Self::from_descriptor(descriptor)
    }
}

/// Does `raw[key]` hold a non-empty string?
pub(crate) fn has_string(raw: &Value, key: &str) -> bool {
    raw.get(key)
        .and_then(Value::as_str)
        .is_some_and(|s| !s.is_empty())
}

/// Does `raw[key]` equal `expected`?
pub(crate) fn str_field_is(raw: &Value, key: &str, expected: &str) -> bool {
    raw.get(key).and_then(Value::as_str) == Some(expected)
}
