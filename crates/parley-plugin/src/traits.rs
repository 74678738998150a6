//! Plugin trait definitions.
//!
//! - [`Plugin`] -- a node of the plugin tree, with lifecycle hooks
//! - [`Platform`] -- a plugin bound to one native request/response pair
//! - [`PluginFactory`] -- builds a plugin from its effective configuration
//!
//! All traits are `Send + Sync`. Async hooks use `#[async_trait]`.

use async_trait::async_trait;
use serde_json::Value;

use parley_types::{AppState, Conversion, ConversionError, OutputTemplate};

use crate::error::PluginError;
use crate::extensible::Extensible;

// ---------------------------------------------------------------------------
// Plugin
// ---------------------------------------------------------------------------

/// A node in the plugin tree.
///
/// A plugin owns its effective configuration (resolved once, at
/// construction) and, when it can host children, an [`Extensible`] holding
/// them. The host drives the hooks:
///
/// 1. [`initialize`](Plugin::initialize) -- optional setup that needs the
///    parent but must finish before any sibling installs.
/// 2. [`install`](Plugin::install) -- the plugin's integration into the
///    parent. Declared children are mounted right after it returns; the
///    plugin only counts as installed once all of them are.
/// 3. [`uninstall`](Plugin::uninstall) -- optional teardown, given the
///    parent or `None` when the parent itself is shutting down.
#[async_trait]
pub trait Plugin: Send + Sync + 'static {
    /// Identity of this node, unique within its parent.
    fn name(&self) -> &str;

    /// The effective configuration, as JSON.
    fn config(&self) -> Value;

    /// Children of this node, if it can host any.
    fn extensible(&self) -> Option<&Extensible> {
        None
    }

    /// Mutable access to this node's children, if it can host any.
    fn extensible_mut(&mut self) -> Option<&mut Extensible> {
        None
    }

    /// Capability query: this node as a [`Platform`].
    fn as_platform(&self) -> Option<&dyn Platform> {
        None
    }

    async fn initialize(&mut self, _parent: &mut Extensible) -> Result<(), PluginError> {
        Ok(())
    }

    async fn install(&mut self, parent: &mut Extensible) -> Result<(), PluginError>;

    async fn uninstall(&mut self, _parent: Option<&mut Extensible>) -> Result<(), PluginError> {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Platform
// ---------------------------------------------------------------------------

/// A plugin that speaks one native platform's request/response format.
///
/// The recognition predicates let a router pick the right platform among
/// many installed ones. They are total: any JSON shape is accepted and
/// anything unexpected yields `false`.
pub trait Platform: Plugin {
    /// Name used for per-platform overrides in an [`OutputTemplate`].
    fn platform_name(&self) -> &str;

    /// The configured type tag stamped into finalized responses.
    fn type_tag(&self) -> &str;

    /// Whether `raw` is a request addressed to this platform.
    fn is_request_related(&self, raw: &Value) -> bool;

    /// Whether `raw` is a response this platform produced.
    fn is_response_related(&self, raw: &Value) -> bool;

    /// Merge `outputs`, convert them to the native response, and finalize
    /// it with the application state.
    fn respond(
        &self,
        outputs: &[OutputTemplate],
        state: &AppState,
    ) -> Result<Conversion<Value>, ConversionError>;

    /// Convert a native response back into a generic template.
    fn parse_response(&self, raw: &Value) -> Result<OutputTemplate, ConversionError>;
}

// ---------------------------------------------------------------------------
// PluginFactory
// ---------------------------------------------------------------------------

/// Builds [`Plugin`] instances from effective configuration.
///
/// The factory is the "constructor" half of a plugin definition: it knows
/// the component's identity and its default config, and turns a resolved
/// config into a node.
pub trait PluginFactory: Send + Sync {
    /// Default identity of plugins built by this factory.
    fn plugin_name(&self) -> &str;

    /// The component's built-in default configuration.
    fn default_config(&self) -> Value;

    /// Build a node named `name` from its effective configuration.
    fn build(&self, name: &str, config: Value) -> Result<Box<dyn Plugin>, PluginError>;
}
