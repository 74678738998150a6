//! [`Extensible`] -- the plugin host every node with children embeds.
//!
//! The host is responsible for:
//!
//! - Constructing plugins from [`PluginDefinition`]s
//! - Driving the initialize / install / uninstall hooks in order
//! - Mounting each installed plugin's declared children
//! - Routing raw payloads to the first platform that recognizes them

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use indexmap::IndexMap;
use serde_json::Value;
use tracing::{info, warn};

use crate::definition::PluginDefinition;
use crate::error::{HookStage, PluginError};
use crate::lifecycle::LifecycleState;
use crate::traits::{Platform, Plugin};

/// An ordered, identity-keyed set of child plugins.
///
/// Plugins are kept in installation order. Identities are unique: a second
/// plugin with an identity already installed is rejected with
/// [`PluginError::DuplicateIdentity`] and the first one stays in place.
///
/// Failures are not rolled back. When a hook fails, everything installed
/// before it stays installed and the error is returned to the caller. The
/// failed node keeps the last state it reached, which [`state`] reports.
///
/// [`state`]: Extensible::state
pub struct Extensible {
    /// Identity of the node that owns this host.
    name: String,
    /// Constructed children waiting to be mounted.
    declared: Vec<Box<dyn Plugin>>,
    /// Installed children, in installation order.
    plugins: IndexMap<String, Box<dyn Plugin>>,
    /// Last lifecycle state reached by each identity this host has handled.
    states: IndexMap<String, LifecycleState>,
}

impl Extensible {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            declared: Vec::new(),
            plugins: IndexMap::new(),
            states: IndexMap::new(),
        }
    }

    /// Identity of the owning node.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Queue a constructed child to be mounted when the owner installs.
    pub fn declare(&mut self, plugin: Box<dyn Plugin>) {
        self.declared.push(plugin);
    }

    /// Identities of children declared but not yet mounted.
    pub fn declared_names(&self) -> Vec<&str> {
        self.declared.iter().map(|p| p.name()).collect()
    }

    // -- installation -------------------------------------------------------

    /// Construct and install one plugin (with its subtree) into this host.
    ///
    /// Runs the plugin's `initialize` hook, then its `install` hook, then
    /// mounts its declared children. The plugin is registered only after
    /// all of that succeeded.
    pub async fn install(
        &mut self,
        definition: impl Into<PluginDefinition>,
    ) -> Result<(), PluginError> {
        self.install_all([definition]).await
    }

    /// Install several sibling plugins.
    ///
    /// Every definition is constructed up front. Then every plugin is
    /// initialized, and only then installed, each pass in order: the same
    /// two passes declared children get when their owner mounts them.
    ///
    /// Stops at the first failure; plugins installed before it stay.
    pub async fn install_all<I>(&mut self, definitions: I) -> Result<(), PluginError>
    where
        I: IntoIterator,
        I::Item: Into<PluginDefinition>,
    {
        let plugins = definitions
            .into_iter()
            .map(|definition| {
                let definition: PluginDefinition = definition.into();
                definition.construct()
            })
            .collect::<Result<Vec<_>, _>>()?;
        self.mount_plugins(plugins).await
    }

    /// Mount every declared child.
    fn mount(&mut self) -> BoxFuture<'_, Result<(), PluginError>> {
        async move {
            let declared = std::mem::take(&mut self.declared);
            self.mount_plugins(declared).await
        }
        .boxed()
    }

    async fn mount_plugins(&mut self, plugins: Vec<Box<dyn Plugin>>) -> Result<(), PluginError> {
        let mut initialized = Vec::with_capacity(plugins.len());
        for mut plugin in plugins {
            self.initialize_node(plugin.as_mut()).await?;
            initialized.push(plugin);
        }
        for plugin in initialized {
            self.install_node(plugin).await?;
        }
        Ok(())
    }

    async fn initialize_node(&mut self, plugin: &mut dyn Plugin) -> Result<(), PluginError> {
        let name = plugin.name().to_owned();
        self.ensure_unique(&name)?;
        self.states.insert(name.clone(), LifecycleState::Constructed);
        plugin
            .initialize(self)
            .await
            .map_err(|e| PluginError::hook(&name, HookStage::Initialize, e))?;
        self.transition(&name, LifecycleState::Initialized)?;
        Ok(())
    }

    async fn install_node(&mut self, mut plugin: Box<dyn Plugin>) -> Result<(), PluginError> {
        let name = plugin.name().to_owned();
        self.ensure_unique(&name)?;
        plugin
            .install(self)
            .await
            .map_err(|e| PluginError::hook(&name, HookStage::Install, e))?;
        if let Some(children) = plugin.extensible_mut() {
            children.mount().await?;
        }
        // The hooks above had the host; one of them may have taken the name.
        self.ensure_unique(&name)?;
        self.transition(&name, LifecycleState::Installed)?;

        info!(plugin = %name, parent = %self.name, "plugin installed");
        self.plugins.insert(name, plugin);
        Ok(())
    }

    /// Advance `name` from its recorded state to `next`.
    fn transition(
        &mut self,
        name: &str,
        next: LifecycleState,
    ) -> Result<LifecycleState, PluginError> {
        let current = self
            .states
            .get_mut(name)
            .ok_or_else(|| PluginError::NotFound(name.to_owned()))?;
        *current = current.advance(next, name)?;
        Ok(*current)
    }

    fn ensure_unique(&self, name: &str) -> Result<(), PluginError> {
        if self.plugins.contains_key(name) {
            return Err(PluginError::DuplicateIdentity(name.to_owned()));
        }
        Ok(())
    }

    // -- removal ------------------------------------------------------------

    /// Uninstall one installed plugin by identity.
    ///
    /// The plugin's own children are uninstalled first, in reverse order,
    /// then its `uninstall` hook runs with this host as the parent.
    pub async fn uninstall(&mut self, name: &str) -> Result<(), PluginError> {
        let plugin = self
            .plugins
            .shift_remove(name)
            .ok_or_else(|| PluginError::NotFound(name.to_owned()))?;
        self.uninstall_node(plugin).await
    }

    async fn uninstall_node(&mut self, mut plugin: Box<dyn Plugin>) -> Result<(), PluginError> {
        let name = plugin.name().to_owned();
        self.transition(&name, LifecycleState::Uninstalled)?;
        if let Some(children) = plugin.extensible_mut() {
            children.unmount().await?;
        }
        plugin
            .uninstall(Some(self))
            .await
            .map_err(|e| PluginError::hook(&name, HookStage::Uninstall, e))?;
        info!(plugin = %name, parent = %self.name, "plugin uninstalled");
        Ok(())
    }

    /// Uninstall every child, last installed first.
    fn unmount(&mut self) -> BoxFuture<'_, Result<(), PluginError>> {
        async move {
            while let Some((_, plugin)) = self.plugins.pop() {
                self.uninstall_node(plugin).await?;
            }
            Ok(())
        }
        .boxed()
    }

    /// Tear the whole host down, last installed first.
    ///
    /// Top-level plugins get `None` as their parent since the host is going
    /// away. Every plugin is attempted; the per-plugin results are returned
    /// in teardown order.
    pub async fn shutdown(mut self) -> Vec<(String, Result<(), PluginError>)> {
        let mut results = Vec::with_capacity(self.plugins.len());
        while let Some((name, mut plugin)) = self.plugins.pop() {
            let result = async {
                self.transition(&name, LifecycleState::Uninstalled)?;
                if let Some(children) = plugin.extensible_mut() {
                    children.unmount().await?;
                }
                plugin
                    .uninstall(None)
                    .await
                    .map_err(|e| PluginError::hook(&name, HookStage::Uninstall, e))
            }
            .await;
            if let Err(e) = &result {
                warn!(plugin = %name, error = %e, "plugin failed to shut down cleanly");
            }
            results.push((name, result));
        }
        info!(host = %self.name, "host shut down");
        results
    }

    // -- queries ------------------------------------------------------------

    pub fn get(&self, name: &str) -> Option<&dyn Plugin> {
        self.plugins.get(name).map(|p| p.as_ref())
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut (dyn Plugin + 'static)> {
        self.plugins.get_mut(name).map(|p| p.as_mut())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.plugins.contains_key(name)
    }

    /// Installed identities, in installation order.
    pub fn names(&self) -> Vec<&str> {
        self.plugins.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &dyn Plugin)> {
        self.plugins.iter().map(|(k, v)| (k.as_str(), v.as_ref()))
    }

    /// Lifecycle state of a direct child.
    ///
    /// Covers declared children waiting to be mounted, installed ones, and
    /// ones that failed part way or were uninstalled: those report the last
    /// state they reached.
    pub fn state(&self, name: &str) -> Option<LifecycleState> {
        self.states.get(name).copied().or_else(|| {
            self.declared
                .iter()
                .any(|p| p.name() == name)
                .then_some(LifecycleState::Constructed)
        })
    }

    // -- routing ------------------------------------------------------------

    /// Every installed platform in the tree, depth-first in installation
    /// order. A platform precedes its own children.
    pub fn platforms(&self) -> Vec<&dyn Platform> {
        let mut out = Vec::new();
        self.collect_platforms(&mut out);
        out
    }

    fn collect_platforms<'a>(&'a self, out: &mut Vec<&'a dyn Platform>) {
        for plugin in self.plugins.values() {
            if let Some(platform) = plugin.as_platform() {
                out.push(platform);
            }
            if let Some(children) = plugin.extensible() {
                children.collect_platforms(out);
            }
        }
    }

    /// Find an installed platform by identity anywhere in the tree.
    pub fn platform(&self, name: &str) -> Option<&dyn Platform> {
        self.platforms().into_iter().find(|p| p.name() == name)
    }

    /// The first platform, in tree order, that recognizes `raw` as its
    /// request.
    pub fn find_platform_for_request(&self, raw: &Value) -> Option<&dyn Platform> {
        self.platforms()
            .into_iter()
            .find(|p| p.is_request_related(raw))
    }

    /// The first platform, in tree order, that recognizes `raw` as its
    /// response.
    pub fn find_platform_for_response(&self, raw: &Value) -> Option<&dyn Platform> {
        self.platforms()
            .into_iter()
            .find(|p| p.is_response_related(raw))
    }
}

impl std::fmt::Debug for Extensible {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Extensible")
            .field("name", &self.name)
            .field("declared", &self.declared_names())
            .field("plugins", &self.names())
            .finish()
    }
}
