//! The platform-agnostic output template.
//!
//! Application logic describes a turn's response once, as an
//! [`OutputTemplate`]; each platform's converter renders it into its native
//! payload. A template may carry per-platform overrides under `platforms`,
//! keyed by platform name. An override field fully supersedes the generic
//! field for that platform (the two are never merged).

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Card kind assumed when a [`Card`] does not name one.
pub const DEFAULT_CARD_KIND: &str = "basic";

/// Generic response description produced by application logic.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutputTemplate {
    /// Main message spoken / displayed to the user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<MessageValue>,

    /// Message used when the user does not answer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reprompt: Option<MessageValue>,

    /// Whether to keep listening, optionally registering dynamic entities.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listen: Option<ListenValue>,

    /// Suggested replies, in display order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quick_replies: Option<Vec<QuickReplyValue>>,

    /// Optional rich card.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card: Option<Card>,

    /// Per-platform overrides, keyed by platform name (e.g. `"Dialogflow"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platforms: Option<BTreeMap<String, PlatformOutputTemplate>>,
}

/// Platform-specific overrides of the generic fields, plus a fully native
/// escape hatch that is merged into the rendered response last.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformOutputTemplate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<MessageValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reprompt: Option<MessageValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub listen: Option<ListenValue>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quick_replies: Option<Vec<QuickReplyValue>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card: Option<Card>,

    /// Raw native payload fragment, deep-merged into the response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub native_response: Option<serde_json::Value>,
}

/// The fields a converter actually renders for one platform, after the
/// platform override has been preferred over the generic value.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EffectiveOutput<'a> {
    pub message: Option<&'a MessageValue>,
    pub reprompt: Option<&'a MessageValue>,
    pub listen: Option<&'a ListenValue>,
    pub quick_replies: Option<&'a [QuickReplyValue]>,
    pub card: Option<&'a Card>,
    pub native_response: Option<&'a serde_json::Value>,
}

impl OutputTemplate {
    /// Template with only a plain text message.
    pub fn with_message(message: impl Into<MessageValue>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::default()
        }
    }

    /// The override block for `platform`, if any.
    pub fn platform(&self, platform: &str) -> Option<&PlatformOutputTemplate> {
        self.platforms.as_ref()?.get(platform)
    }

    /// Mutable access to the override block for `platform`, creating it.
    pub fn platform_mut(&mut self, platform: &str) -> &mut PlatformOutputTemplate {
        self.platforms
            .get_or_insert_with(BTreeMap::new)
            .entry(platform.to_owned())
            .or_default()
    }

    /// Resolve the effective fields for `platform`.
    ///
    /// Each field comes from the platform override when present there,
    /// otherwise from the generic template.
    pub fn effective(&self, platform: &str) -> EffectiveOutput<'_> {
        let over = self.platform(platform);
        EffectiveOutput {
            message: over
                .and_then(|p| p.message.as_ref())
                .or(self.message.as_ref()),
            reprompt: over
                .and_then(|p| p.reprompt.as_ref())
                .or(self.reprompt.as_ref()),
            listen: over
                .and_then(|p| p.listen.as_ref())
                .or(self.listen.as_ref()),
            quick_replies: over
                .and_then(|p| p.quick_replies.as_deref())
                .or(self.quick_replies.as_deref()),
            card: over.and_then(|p| p.card.as_ref()).or(self.card.as_ref()),
            native_response: over.and_then(|p| p.native_response.as_ref()),
        }
    }
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

/// A message: either bare text or a structured value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageValue {
    Text(String),
    Structured(Message),
}

/// Structured message with an optional display variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Text (spoken on voice platforms).
    pub text: String,
    /// Text shown on screen surfaces, if it differs from `text`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_text: Option<String>,
}

impl MessageValue {
    /// The primary text.
    pub fn text(&self) -> &str {
        match self {
            Self::Text(text) => text,
            Self::Structured(msg) => &msg.text,
        }
    }

    /// The text for screen surfaces: `displayText` if set, else `text`.
    pub fn display_text(&self) -> &str {
        match self {
            Self::Text(text) => text,
            Self::Structured(msg) => msg.display_text.as_deref().unwrap_or(&msg.text),
        }
    }
}

impl From<&str> for MessageValue {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<String> for MessageValue {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

// ---------------------------------------------------------------------------
// Quick replies
// ---------------------------------------------------------------------------

/// A reply affordance: either bare text or a structured value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QuickReplyValue {
    Text(String),
    Structured(QuickReply),
}

/// Structured quick reply; `value` is what the platform sends back when
/// the reply is chosen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickReply {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl QuickReplyValue {
    /// The visible label.
    pub fn text(&self) -> &str {
        match self {
            Self::Text(text) => text,
            Self::Structured(reply) => &reply.text,
        }
    }

    /// Mutable access to the visible label.
    pub fn text_mut(&mut self) -> &mut String {
        match self {
            Self::Text(text) => text,
            Self::Structured(reply) => &mut reply.text,
        }
    }

    /// The payload sent back on selection: `value` if set, else the label.
    pub fn payload(&self) -> &str {
        match self {
            Self::Text(text) => text,
            Self::Structured(reply) => reply.value.as_deref().unwrap_or(&reply.text),
        }
    }
}

impl From<&str> for QuickReplyValue {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<String> for QuickReplyValue {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

// ---------------------------------------------------------------------------
// Card
// ---------------------------------------------------------------------------

/// A generic rich card. Platforms render it through a renderer registered
/// for the card's kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    /// Card kind; [`DEFAULT_CARD_KIND`] when absent.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_alt_text: Option<String>,
}

impl Card {
    /// A basic card with only a title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            kind: None,
            title: title.into(),
            subtitle: None,
            content: None,
            image_url: None,
            image_alt_text: None,
        }
    }

    /// The card kind used for renderer lookup.
    pub fn kind(&self) -> &str {
        self.kind.as_deref().unwrap_or(DEFAULT_CARD_KIND)
    }
}

// ---------------------------------------------------------------------------
// Listen / dynamic entities
// ---------------------------------------------------------------------------

/// `listen`: a plain keep-listening flag or a directive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ListenValue {
    Flag(bool),
    Directive(ListenDirective),
}

impl ListenValue {
    /// The dynamic-entity directive, if this is a directive carrying one.
    pub fn entities(&self) -> Option<&DynamicEntities> {
        match self {
            Self::Flag(_) => None,
            Self::Directive(directive) => directive.entities.as_ref(),
        }
    }

    /// Whether the session should stay open. A directive implies listening.
    pub fn keeps_listening(&self) -> bool {
        match self {
            Self::Flag(flag) => *flag,
            Self::Directive(_) => true,
        }
    }
}

/// Listen directive carrying optional dynamic-entity registration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListenDirective {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entities: Option<DynamicEntities>,
}

/// Dynamic entity types to register for the session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DynamicEntities {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<DynamicEntitiesMode>,
    #[serde(default)]
    pub types: Vec<DynamicEntity>,
}

/// How dynamic entities combine with the platform's static entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DynamicEntitiesMode {
    Replace,
    Merge,
    Clear,
}

/// One named entity type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DynamicEntity {
    pub name: String,
    #[serde(default)]
    pub values: Vec<DynamicEntityValue>,
}

/// One recognizable value of a dynamic entity type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DynamicEntityValue {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Canonical value.
    pub value: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub synonyms: Vec<String>,
}

impl DynamicEntities {
    /// Directive with the given mode and types.
    pub fn new(mode: DynamicEntitiesMode, types: Vec<DynamicEntity>) -> Self {
        Self {
            mode: Some(mode),
            types,
        }
    }
}

impl From<DynamicEntities> for ListenValue {
    fn from(entities: DynamicEntities) -> Self {
        Self::Directive(ListenDirective {
            entities: Some(entities),
        })
    }
}
