//! Output converters and platform plugins for parley.
//!
//! A platform plugin translates parley's platform-agnostic
//! [`OutputTemplate`](parley_types::OutputTemplate) into one native response
//! shape and recognizes that platform's inbound requests. Each platform is a
//! [`PlatformKind`] bound to an [`OutputConverterStrategy`]; the generic
//! [`PlatformPlugin<K>`] turns it into a plugin node that an
//! [`Extensible`](parley_plugin::Extensible) host installs.
//!
//! # Conversion pipeline
//!
//! ```text
//! [OutputTemplate] ──prepare_output──> OutputTemplate
//!                                         │
//!                      ResolvedOutput::resolve (override > generic, sanitize)
//!                                         │
//!                      OutputConverterStrategy::render
//!                                         │
//!                      merge nativeResponse escape hatch
//!                                         │
//!                      finalize_response (type tag + session)
//! ```
//!
//! # Platforms
//!
//! - [`core`] -- generic passthrough, response carries the template itself
//! - [`dialogflow`] -- Dialogflow ES fulfillment responses

pub mod converter;
pub mod core;
pub mod dialogflow;
pub mod platform;
pub mod prepare;
pub mod render;
pub mod sanitize;

pub use converter::{
    ConverterConfig, NativeResponse, OutputConverterStrategy, ResolvedOutput, finalize_response,
};
pub use platform::{
    PlatformConfig, PlatformDescriptor, PlatformFactory, PlatformKind, PlatformPlugin, ResponseOf,
    make_platform,
};
pub use prepare::merge_templates;
pub use render::{PlatformRenderable, RendererRegistry};
pub use sanitize::{SanitizationConfig, SanitizationLimits, Sanitizer};

pub use crate::core::{CORE_TYPE_TAG, Core, CorePlatform, CorePlatformFactory};
pub use dialogflow::{
    DIALOGFLOW_TYPE_TAG, Dialogflow, DialogflowPlatform, DialogflowPlatformFactory,
};

use parley_plugin::PluginDefinition;

/// Definitions for the stock platform set, in install order: Dialogflow,
/// then Core.
pub fn default_platforms() -> Vec<PluginDefinition> {
    vec![
        DialogflowPlatformFactory::new().definition(),
        CorePlatformFactory::new().definition(),
    ]
}
