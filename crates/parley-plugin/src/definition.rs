//! Plugin definitions: what to build, with which override, with which
//! children.

use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::debug;

use crate::config::{normalize_override, resolve_value};
use crate::error::PluginError;
use crate::traits::{Plugin, PluginFactory};

/// A declaration of one plugin node and its subtree.
///
/// A bare factory (`Arc<dyn PluginFactory>`) converts into a definition
/// that uses the factory's defaults and declares no children.
#[derive(Clone)]
pub struct PluginDefinition {
    factory: Arc<dyn PluginFactory>,
    alias: Option<String>,
    config: Option<Value>,
    plugins: Vec<PluginDefinition>,
}

impl PluginDefinition {
    pub fn new(factory: Arc<dyn PluginFactory>) -> Self {
        Self {
            factory,
            alias: None,
            config: None,
            plugins: Vec::new(),
        }
    }

    /// Partial config override, merged over the factory's defaults.
    pub fn with_config(mut self, config: Value) -> Self {
        self.config = Some(config);
        self
    }

    /// Append a child declaration.
    pub fn with_plugin(mut self, plugin: impl Into<PluginDefinition>) -> Self {
        self.plugins.push(plugin.into());
        self
    }

    /// Replace the child declarations.
    pub fn with_plugins(mut self, plugins: Vec<PluginDefinition>) -> Self {
        self.plugins = plugins;
        self
    }

    /// Install under `alias` instead of the factory's plugin name.
    pub fn named(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Identity the constructed node will have.
    pub fn identity(&self) -> &str {
        self.alias
            .as_deref()
            .unwrap_or_else(|| self.factory.plugin_name())
    }

    /// The effective configuration this definition resolves to.
    pub fn effective_config(&self) -> Value {
        let empty = Value::Object(Map::new());
        let override_value = self
            .config
            .as_ref()
            .map(normalize_override)
            .unwrap_or(empty);
        resolve_value(&self.factory.default_config(), &override_value)
    }

    /// Build the node and, recursively, its declared children.
    ///
    /// Children are constructed first, in declaration order, and handed to
    /// the node's [`Extensible`](crate::Extensible) as declared (not yet
    /// installed) plugins.
    pub fn construct(&self) -> Result<Box<dyn Plugin>, PluginError> {
        let name = self.identity().to_owned();

        let children = self
            .plugins
            .iter()
            .map(PluginDefinition::construct)
            .collect::<Result<Vec<_>, _>>()?;

        let mut plugin = self.factory.build(&name, self.effective_config())?;

        if !children.is_empty() {
            let host = plugin
                .extensible_mut()
                .ok_or_else(|| PluginError::NotExtensible(name.clone()))?;
            for child in children {
                host.declare(child);
            }
        }

        debug!(plugin = %name, children = self.plugins.len(), "plugin constructed");
        Ok(plugin)
    }
}

impl From<Arc<dyn PluginFactory>> for PluginDefinition {
    fn from(factory: Arc<dyn PluginFactory>) -> Self {
        Self::new(factory)
    }
}

impl fmt::Debug for PluginDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginDefinition")
            .field("identity", &self.identity())
            .field("config", &self.config)
            .field("plugins", &self.plugins)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extensible::Extensible;
    use async_trait::async_trait;
    use serde_json::json;

    struct Node {
        name: String,
        config: Value,
        host: Option<Extensible>,
    }

    #[async_trait]
    impl Plugin for Node {
        fn name(&self) -> &str {
            &self.name
        }
        fn config(&self) -> Value {
            self.config.clone()
        }
        fn extensible(&self) -> Option<&Extensible> {
            self.host.as_ref()
        }
        fn extensible_mut(&mut self) -> Option<&mut Extensible> {
            self.host.as_mut()
        }
        async fn install(&mut self, _parent: &mut Extensible) -> Result<(), PluginError> {
            Ok(())
        }
    }

    struct NodeFactory {
        name: &'static str,
        extensible: bool,
    }

    impl PluginFactory for NodeFactory {
        fn plugin_name(&self) -> &str {
            self.name
        }
        fn default_config(&self) -> Value {
            json!({"limits": {"max": 10, "min": 1}, "tags": ["x"]})
        }
        fn build(&self, name: &str, config: Value) -> Result<Box<dyn Plugin>, PluginError> {
            Ok(Box::new(Node {
                name: name.to_owned(),
                config,
                host: self.extensible.then(|| Extensible::new(name)),
            }))
        }
    }

    fn factory(name: &'static str, extensible: bool) -> Arc<dyn PluginFactory> {
        Arc::new(NodeFactory { name, extensible })
    }

    #[test]
    fn bare_factory_uses_defaults() {
        let def = PluginDefinition::from(factory("Leaf", false));
        let node = def.construct().unwrap();
        assert_eq!(node.name(), "Leaf");
        assert_eq!(node.config(), json!({"limits": {"max": 10, "min": 1}, "tags": ["x"]}));
    }

    #[test]
    fn override_is_merged_and_normalized() {
        let def = PluginDefinition::new(factory("Leaf", false))
            .with_config(json!({"limits": {"max": 3}, "tags": [], "extraKey": true}));
        let node = def.construct().unwrap();
        assert_eq!(
            node.config(),
            json!({"limits": {"max": 3, "min": 1}, "tags": [], "extra_key": true})
        );
    }

    #[test]
    fn alias_overrides_identity() {
        let def = PluginDefinition::new(factory("Leaf", false)).named("Other");
        assert_eq!(def.identity(), "Other");
        assert_eq!(def.construct().unwrap().name(), "Other");
    }

    #[test]
    fn children_are_declared_in_order() {
        let def = PluginDefinition::new(factory("Parent", true))
            .with_plugin(PluginDefinition::new(factory("Leaf", false)).named("A"))
            .with_plugin(PluginDefinition::new(factory("Leaf", false)).named("B"));
        let node = def.construct().unwrap();
        let host = node.extensible().unwrap();
        assert_eq!(host.declared_names(), vec!["A", "B"]);
        assert!(host.is_empty());
    }

    #[test]
    fn children_on_leaf_are_rejected() {
        let def = PluginDefinition::new(factory("Leaf", false))
            .with_plugin(factory("Child", false));
        match def.construct() {
            Err(PluginError::NotExtensible(name)) => assert_eq!(name, "Leaf"),
            Err(other) => panic!("expected NotExtensible, got {other:?}"),
            Ok(_) => panic!("expected error"),
        }
    }
}
