//! Dialogflow output converter.

use std::sync::Arc;

use parley_types::output::DEFAULT_CARD_KIND;
use parley_types::{
    ConversionWarning, DynamicEntities, DynamicEntitiesMode, DynamicEntity, DynamicEntityValue,
    ListenValue, MessageValue, OutputTemplate, QuickReplyValue,
};

use crate::converter::{ConverterConfig, OutputConverterStrategy, ResolvedOutput};
use crate::render::{PlatformRenderable, RendererRegistry};
use crate::sanitize::emit;

use super::card::BasicCardRenderer;
use super::types::{
    DialogflowCard, DialogflowResponse, EntityEntry, EntityOverrideMode, MessageBody,
    QuickReplies, SessionEntityType, Text,
};

/// Key of the Dialogflow override block in an output template.
pub const DIALOGFLOW_PLATFORM_NAME: &str = "Dialogflow";

/// Converts output templates to Dialogflow fulfillment responses.
///
/// Fulfillment messages are emitted in a fixed order: text, then quick
/// replies, then card. Some clients render them in array order.
#[derive(Debug, Clone)]
pub struct DialogflowOutputConverter {
    config: ConverterConfig,
    cards: RendererRegistry<DialogflowCard>,
}

impl DialogflowOutputConverter {
    pub fn new(config: ConverterConfig) -> Self {
        Self {
            config,
            cards: RendererRegistry::new(DIALOGFLOW_PLATFORM_NAME)
                .with(DEFAULT_CARD_KIND, Arc::new(BasicCardRenderer)),
        }
    }

    /// Register a renderer for another card kind.
    pub fn with_card_renderer(
        mut self,
        kind: impl Into<String>,
        renderer: Arc<dyn PlatformRenderable<DialogflowCard>>,
    ) -> Self {
        self.cards.register(kind, renderer);
        self
    }

    pub fn card_renderers(&self) -> &RendererRegistry<DialogflowCard> {
        &self.cards
    }

    pub fn convert_message(message: &MessageValue) -> Text {
        Text {
            text: vec![message.display_text().to_owned()],
        }
    }

    pub fn convert_quick_reply(quick_reply: &QuickReplyValue) -> String {
        quick_reply.payload().to_owned()
    }

    fn session_entity_types(entities: &DynamicEntities) -> Vec<SessionEntityType> {
        let mode = match entities.mode {
            Some(DynamicEntitiesMode::Merge) => EntityOverrideMode::Supplement,
            _ => EntityOverrideMode::Override,
        };
        entities
            .types
            .iter()
            .map(|entity| SessionEntityType {
                name: entity.name.clone(),
                entity_override_mode: mode,
                entities: entity.values.iter().map(entity_entry).collect(),
            })
            .collect()
    }
}

/// Native entry for one dynamic value: the id (or the value) is the
/// reference value, and the synonyms always start with the canonical value.
fn entity_entry(value: &DynamicEntityValue) -> EntityEntry {
    let mut synonyms = vec![value.value.clone()];
    for synonym in &value.synonyms {
        if !synonyms.contains(synonym) {
            synonyms.push(synonym.clone());
        }
    }
    EntityEntry {
        value: value.id.clone().unwrap_or_else(|| value.value.clone()),
        synonyms,
    }
}

fn dynamic_entity(session_entity_type: &SessionEntityType) -> DynamicEntity {
    DynamicEntity {
        name: session_entity_type.name.clone(),
        values: session_entity_type
            .entities
            .iter()
            .map(|entry| DynamicEntityValue {
                id: Some(entry.value.clone()),
                value: entry.value.clone(),
                synonyms: entry.synonyms.clone(),
            })
            .collect(),
    }
}

impl OutputConverterStrategy for DialogflowOutputConverter {
    type Response = DialogflowResponse;

    fn platform_name(&self) -> &str {
        DIALOGFLOW_PLATFORM_NAME
    }

    fn config(&self) -> &ConverterConfig {
        &self.config
    }

    fn render(
        &self,
        output: &ResolvedOutput,
        warnings: &mut Vec<ConversionWarning>,
    ) -> DialogflowResponse {
        let mut response = DialogflowResponse::default();

        if let Some(entities) = output.listen.as_ref().and_then(ListenValue::entities) {
            if !entities.types.is_empty() {
                response.session_entity_types = Some(Self::session_entity_types(entities));
            }
        }

        if let Some(message) = output.message.as_ref().filter(|m| !m.display_text().is_empty()) {
            response.push_message(MessageBody::text(Self::convert_message(message)));
        }

        if let Some(quick_replies) = output.quick_replies.as_ref().filter(|q| !q.is_empty()) {
            response.push_message(MessageBody::quick_replies(QuickReplies {
                title: None,
                quick_replies: quick_replies.iter().map(Self::convert_quick_reply).collect(),
            }));
        }

        if let Some(card) = &output.card {
            match self.cards.render(card) {
                Ok(native) => response.push_message(MessageBody::card(native)),
                Err(e) => emit(
                    DIALOGFLOW_PLATFORM_NAME,
                    warnings,
                    ConversionWarning::Omitted {
                        path: output.path("card"),
                        reason: e.to_string(),
                    },
                ),
            }
        }

        response
    }

    fn from_response(&self, response: &DialogflowResponse) -> OutputTemplate {
        let mut output = OutputTemplate::default();

        if let Some(text) = response.messages().find_map(|m| m.text.as_ref()) {
            output.message = Some(MessageValue::Text(text.joined()));
        }

        if let Some(replies) = response.messages().find_map(|m| m.quick_replies.as_ref()) {
            if !replies.quick_replies.is_empty() {
                output.quick_replies = Some(
                    replies
                        .quick_replies
                        .iter()
                        .cloned()
                        .map(QuickReplyValue::Text)
                        .collect(),
                );
            }
        }

        if let Some(card) = response.messages().find_map(|m| m.card.as_ref()) {
            output.card = self.cards.restore(card);
        }

        if let Some(types) = response.session_entity_types.as_ref().filter(|t| !t.is_empty()) {
            let mode = match types[0].entity_override_mode {
                EntityOverrideMode::Supplement => DynamicEntitiesMode::Merge,
                _ => DynamicEntitiesMode::Replace,
            };
            let entities = DynamicEntities::new(mode, types.iter().map(dynamic_entity).collect());
            output.listen = Some(entities.into());
        }

        output
    }
}
