//! Plugin lifecycle state machine.

use std::fmt;

use tracing::debug;

use crate::error::PluginError;

/// Where a plugin node is in its lifecycle.
///
/// ```text
/// Constructed -> Initialized -> Installed -> Uninstalled
/// ```
///
/// `Uninstalled` is terminal: a node that has been uninstalled is dropped
/// and a fresh one must be constructed to install the plugin again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleState {
    Constructed,
    Initialized,
    Installed,
    Uninstalled,
}

impl LifecycleState {
    /// Whether `self -> next` is an edge of the state machine.
    pub fn can_advance_to(self, next: LifecycleState) -> bool {
        matches!(
            (self, next),
            (Self::Constructed, Self::Initialized)
                | (Self::Initialized, Self::Installed)
                | (Self::Installed, Self::Uninstalled)
        )
    }

    /// Move to `next`, or fail with [`PluginError::InvalidTransition`].
    pub fn advance(self, next: LifecycleState, plugin: &str) -> Result<Self, PluginError> {
        if !self.can_advance_to(next) {
            return Err(PluginError::InvalidTransition {
                plugin: plugin.to_owned(),
                from: self,
                to: next,
            });
        }
        debug!(plugin = %plugin, from = %self, to = %next, "lifecycle transition");
        Ok(next)
    }

    pub fn is_terminal(self) -> bool {
        self == Self::Uninstalled
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Constructed => "constructed",
            Self::Initialized => "initialized",
            Self::Installed => "installed",
            Self::Uninstalled => "uninstalled",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use LifecycleState::*;

    #[test]
    fn forward_path_is_allowed() {
        let state = Constructed
            .advance(Initialized, "p")
            .and_then(|s| s.advance(Installed, "p"))
            .and_then(|s| s.advance(Uninstalled, "p"))
            .unwrap();
        assert!(state.is_terminal());
    }

    #[test]
    fn uninstalled_cannot_be_reinstalled() {
        let err = Uninstalled.advance(Installed, "p").unwrap_err();
        assert_eq!(err.to_string(), "plugin p cannot move from uninstalled to installed");
    }

    #[test]
    fn skipping_initialization_is_rejected() {
        assert!(!Constructed.can_advance_to(Installed));
        assert!(!Initialized.can_advance_to(Uninstalled));
        assert!(!Installed.can_advance_to(Installed));
    }
}
