//! Plugin error types.
//!
//! Defines [`PluginError`], the unified error type for building,
//! configuring, installing and tearing down plugins.

use std::fmt;

use thiserror::Error;

use crate::lifecycle::LifecycleState;

/// Lifecycle hook that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookStage {
    Initialize,
    Install,
    Uninstall,
}

impl fmt::Display for HookStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Initialize => "initialize",
            Self::Install => "install",
            Self::Uninstall => "uninstall",
        })
    }
}

/// Errors produced by plugin operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PluginError {
    /// The merged configuration does not fit the plugin's config schema.
    #[error("invalid config for plugin {plugin}: {reason}")]
    ConfigMerge {
        /// Identity of the plugin being configured.
        plugin: String,
        /// What did not deserialize.
        reason: String,
    },

    /// A plugin with this identity is already installed in the host.
    #[error("a plugin named {0} is already installed")]
    DuplicateIdentity(String),

    /// A lifecycle hook failed. Installation of the subtree is aborted and
    /// nothing installed before it is rolled back.
    #[error("{stage} hook of plugin {plugin} failed: {reason}")]
    LifecycleHook {
        plugin: String,
        stage: HookStage,
        reason: String,
    },

    /// A lifecycle transition that the state machine does not allow.
    #[error("plugin {plugin} cannot move from {from} to {to}")]
    InvalidTransition {
        plugin: String,
        from: LifecycleState,
        to: LifecycleState,
    },

    /// No plugin with this identity is installed.
    #[error("plugin not found: {0}")]
    NotFound(String),

    /// Child plugins were declared for a plugin that cannot host them.
    #[error("plugin {0} does not accept child plugins")]
    NotExtensible(String),

    /// Plugin-specific failure raised from inside a hook.
    #[error("plugin execution failed: {0}")]
    ExecutionFailed(String),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PluginError {
    /// Wrap a hook's error as [`PluginError::LifecycleHook`].
    ///
    /// Errors that already carry lifecycle context (a nested child's hook
    /// failing, a duplicate child) pass through untouched so the innermost
    /// failing plugin stays named.
    pub fn hook(plugin: &str, stage: HookStage, err: PluginError) -> Self {
        match err {
            err @ (Self::LifecycleHook { .. }
            | Self::DuplicateIdentity(_)
            | Self::InvalidTransition { .. }) => err,
            other => Self::LifecycleHook {
                plugin: plugin.to_owned(),
                stage,
                reason: other.to_string(),
            },
        }
    }
}
