//! Plugin tree and extensible host for parley.
//!
//! Every component of a parley application is a plugin node: it has an
//! identity, an effective configuration resolved from its defaults and a
//! caller-supplied partial override, and an ordered list of child plugins.
//! An [`Extensible`] host installs children in declaration order, keeps them
//! in an identity-keyed registry, and answers "which platform recognizes
//! this payload" by walking that registry in order.
//!
//! # Lifecycle
//!
//! ```text
//! PluginDefinition ──construct()──> Box<dyn Plugin>        Constructed
//!                                        │
//!                         Plugin::initialize(&mut parent)   Initialized
//!                                        │
//!                         Plugin::install(&mut parent)
//!                         children mounted in order          Installed
//!                                        │
//!                         Plugin::uninstall(Option<parent>)  Uninstalled
//! ```
//!
//! # Trait Overview
//!
//! | Trait | Purpose |
//! |-------|---------|
//! | [`Plugin`] | A node in the plugin tree, with lifecycle hooks |
//! | [`Platform`] | A plugin that converts output for one native platform |
//! | [`PluginFactory`] | Builds a plugin from its effective config |

pub mod config;
pub mod definition;
pub mod error;
pub mod extensible;
pub mod lifecycle;
pub mod traits;

pub use config::{resolve, resolve_value};
pub use definition::PluginDefinition;
pub use error::{HookStage, PluginError};
pub use extensible::Extensible;
pub use lifecycle::LifecycleState;
pub use traits::{Platform, Plugin, PluginFactory};
