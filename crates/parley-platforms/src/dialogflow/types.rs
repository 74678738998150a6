//! Dialogflow webhook request and fulfillment response types.
//!
//! Requests follow the Dialogflow ES webhook format (`camelCase`). Responses
//! use the `snake_case` protobuf field names, with every fulfillment message
//! wrapped as `{"message": {<kind>: ...}}`. Unknown fields survive a
//! round-trip through the flattened `extra` maps.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use parley_types::AppState;

use crate::converter::NativeResponse;

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// A Dialogflow webhook request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogflowRequest {
    /// Unique id of the detect-intent response.
    pub response_id: String,
    /// Full session path (`projects/<p>/agent/sessions/<id>`).
    pub session: String,
    pub query_result: QueryResult,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_detect_intent_request: Option<Value>,
}

/// Result of the conversational query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct QueryResult {
    pub query_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language_code: Option<String>,
    pub parameters: Map<String, Value>,
    pub all_required_params_present: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intent: Option<Intent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intent_detection_confidence: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub output_contexts: Vec<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Intent {
    pub name: String,
    pub display_name: String,
    pub is_fallback: bool,
}

// ---------------------------------------------------------------------------
// Response
// ---------------------------------------------------------------------------

/// A Dialogflow fulfillment response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DialogflowResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fulfillment_messages: Option<Vec<FulfillmentMessage>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_entity_types: Option<Vec<SessionEntityType>>,
    /// Type tag of the platform that produced the response.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub platform_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<DialogflowSession>,
    /// Fields without a typed counterpart (e.g. `payload`, `output_contexts`).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DialogflowResponse {
    /// Append a fulfillment message.
    pub fn push_message(&mut self, message: MessageBody) {
        self.fulfillment_messages
            .get_or_insert_with(Vec::new)
            .push(FulfillmentMessage::new(message));
    }

    /// Fulfillment message bodies, in order.
    pub fn messages(&self) -> impl Iterator<Item = &MessageBody> {
        self.fulfillment_messages
            .iter()
            .flatten()
            .map(|m| &m.message)
    }
}

impl NativeResponse for DialogflowResponse {
    fn set_platform_type(&mut self, type_tag: &str) {
        self.platform_type = Some(type_tag.to_owned());
    }

    fn set_session(&mut self, state: &AppState) {
        self.session = Some(DialogflowSession {
            data: state.session.clone(),
        });
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DialogflowSession {
    #[serde(default)]
    pub data: Map<String, Value>,
}

/// One entry of `fulfillment_messages`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FulfillmentMessage {
    pub message: MessageBody,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FulfillmentMessage {
    pub fn new(message: MessageBody) -> Self {
        Self {
            message,
            extra: Map::new(),
        }
    }
}

/// The body of a fulfillment message. The converter sets exactly one kind
/// per message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<Text>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quick_replies: Option<QuickReplies>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card: Option<DialogflowCard>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl MessageBody {
    pub fn text(text: Text) -> Self {
        Self {
            text: Some(text),
            ..Self::default()
        }
    }

    pub fn quick_replies(quick_replies: QuickReplies) -> Self {
        Self {
            quick_replies: Some(quick_replies),
            ..Self::default()
        }
    }

    pub fn card(card: DialogflowCard) -> Self {
        Self {
            card: Some(card),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Text {
    #[serde(default)]
    pub text: Vec<String>,
}

impl Text {
    /// Lines joined with a single space.
    pub fn joined(&self) -> String {
        self.text.join(" ")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickReplies {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default)]
    pub quick_replies: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogflowCard {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub buttons: Vec<CardButton>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardButton {
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postback: Option<String>,
}

// ---------------------------------------------------------------------------
// Session entities
// ---------------------------------------------------------------------------

/// How session entities combine with the agent's developer entities.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityOverrideMode {
    #[default]
    #[serde(rename = "ENTITY_OVERRIDE_MODE_UNSPECIFIED")]
    Unspecified,
    #[serde(rename = "ENTITY_OVERRIDE_MODE_OVERRIDE")]
    Override,
    #[serde(rename = "ENTITY_OVERRIDE_MODE_SUPPLEMENT")]
    Supplement,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionEntityType {
    pub name: String,
    #[serde(default)]
    pub entity_override_mode: EntityOverrideMode,
    #[serde(default)]
    pub entities: Vec<EntityEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityEntry {
    pub value: String,
    #[serde(default)]
    pub synonyms: Vec<String>,
}
