//! Core platform plugin.
//!
//! A generic passthrough platform: requests and responses use parley's own
//! shapes and the response carries the output template itself. Applications
//! use it for custom clients, tests and replay.
//!
//! # Modules
//!
//! - [`types`] -- request/response types
//! - [`converter`] -- the passthrough output converter

pub mod converter;
pub mod types;

use serde_json::Value;

pub use converter::{CORE_PLATFORM_NAME, CoreOutputConverter};
pub use types::{CORE_RESPONSE_VERSION, CoreRequest, CoreResponse};

use crate::converter::ConverterConfig;
use crate::platform::{PlatformFactory, PlatformKind, PlatformPlugin, has_string, str_field_is};
use crate::sanitize::SanitizationLimits;

/// Type tag of the default Core platform.
pub const CORE_TYPE_TAG: &str = "parley-platform-core";

/// Platform kind marker for Core.
#[derive(Debug, Clone, Copy, Default)]
pub struct Core;

pub type CorePlatform = PlatformPlugin<Core>;
pub type CorePlatformFactory = PlatformFactory<Core>;

impl PlatformKind for Core {
    const NAME: &'static str = CORE_PLATFORM_NAME;
    const DEFAULT_TYPE_TAG: &'static str = CORE_TYPE_TAG;

    type Request = CoreRequest;
    type Strategy = CoreOutputConverter;

    fn default_limits() -> SanitizationLimits {
        SanitizationLimits::default()
    }

    fn strategy(config: ConverterConfig) -> CoreOutputConverter {
        CoreOutputConverter::new(config)
    }

    fn is_request(raw: &Value, type_tag: &str) -> bool {
        has_string(raw, "version")
            && raw.get("request").is_some_and(|r| has_string(r, "type"))
            && str_field_is(raw, "type", type_tag)
    }

    fn is_response(raw: &Value, type_tag: &str) -> bool {
        has_string(raw, "version")
            && raw.get("output").is_some_and(Value::is_object)
            && raw.get("session").is_some_and(Value::is_object)
            && raw.get("context").is_some_and(Value::is_object)
            && str_field_is(raw, "type", type_tag)
    }
}
