//! # parley-types
//!
//! Core type definitions for the parley conversational platform layer.
//!
//! This crate is the foundation of the dependency graph -- all other
//! parley crates depend on it. It contains:
//!
//! - **[`output`]** -- the platform-agnostic [`OutputTemplate`] and its values
//! - **[`state`]** -- [`AppState`], the session state copied into responses
//! - **[`conversion`]** -- [`Conversion`] results and [`ConversionWarning`] events
//! - **[`error`]** -- [`ConversionError`]
//! - **[`merge`]** -- JSON deep merge and key normalization primitives

pub mod conversion;
pub mod error;
pub mod merge;
pub mod output;
pub mod state;

pub use conversion::{Conversion, ConversionWarning};
pub use error::{ConversionError, Result};
pub use output::{
    Card, DynamicEntities, DynamicEntitiesMode, DynamicEntity, DynamicEntityValue,
    EffectiveOutput, ListenDirective, ListenValue, Message, MessageValue, OutputTemplate,
    PlatformOutputTemplate, QuickReply, QuickReplyValue,
};
pub use state::AppState;
