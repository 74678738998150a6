//! Dialogflow platform plugin.
//!
//! Converts output templates to Dialogflow ES fulfillment responses and
//! recognizes Dialogflow webhook requests. The plugin is installed into a
//! host through [`DialogflowPlatformFactory`].
//!
//! # Modules
//!
//! - [`types`] -- webhook request and fulfillment response types
//! - [`converter`] -- the output converter
//! - [`card`] -- card renderers

pub mod card;
pub mod converter;
pub mod types;

use serde_json::Value;

pub use card::BasicCardRenderer;
pub use converter::{DIALOGFLOW_PLATFORM_NAME, DialogflowOutputConverter};
pub use types::{DialogflowRequest, DialogflowResponse, EntityOverrideMode};

use crate::converter::ConverterConfig;
use crate::platform::{PlatformFactory, PlatformKind, PlatformPlugin, str_field_is};
use crate::sanitize::SanitizationLimits;

/// Type tag of the default Dialogflow platform.
pub const DIALOGFLOW_TYPE_TAG: &str = "dialogflow";

/// Maximum characters of one text response.
pub const TEXT_MAX_LENGTH: usize = 4096;
/// Maximum number of quick replies.
pub const QUICK_REPLIES_MAX_SIZE: usize = 20;
/// Maximum characters of one quick reply.
pub const QUICK_REPLY_MAX_LENGTH: usize = 20;

/// Platform kind marker for Dialogflow.
#[derive(Debug, Clone, Copy, Default)]
pub struct Dialogflow;

pub type DialogflowPlatform = PlatformPlugin<Dialogflow>;
pub type DialogflowPlatformFactory = PlatformFactory<Dialogflow>;

impl PlatformKind for Dialogflow {
    const NAME: &'static str = DIALOGFLOW_PLATFORM_NAME;
    const DEFAULT_TYPE_TAG: &'static str = DIALOGFLOW_TYPE_TAG;

    type Request = DialogflowRequest;
    type Strategy = DialogflowOutputConverter;

    fn default_limits() -> SanitizationLimits {
        SanitizationLimits {
            text_max_length: Some(TEXT_MAX_LENGTH),
            quick_replies_max_size: Some(QUICK_REPLIES_MAX_SIZE),
            quick_reply_max_length: Some(QUICK_REPLY_MAX_LENGTH),
        }
    }

    fn strategy(config: ConverterConfig) -> DialogflowOutputConverter {
        DialogflowOutputConverter::new(config)
    }

    fn is_request(raw: &Value, _type_tag: &str) -> bool {
        raw.get("responseId").is_some_and(Value::is_string)
            && raw.get("queryResult").is_some_and(Value::is_object)
            && raw.get("session").is_some_and(Value::is_string)
    }

    fn is_response(raw: &Value, type_tag: &str) -> bool {
        str_field_is(raw, "type", type_tag)
            && (raw.get("fulfillment_messages").is_some_and(Value::is_array)
                || raw.get("session_entity_types").is_some_and(Value::is_array))
    }
}
