//! Card rendering for Dialogflow.

use parley_types::{Card, ConversionError};

use crate::render::PlatformRenderable;

use super::types::DialogflowCard;

/// Renders `basic` cards as Dialogflow cards.
///
/// Dialogflow cards have no body text, so a card without a subtitle shows
/// its `content` as the subtitle.
#[derive(Debug, Clone, Copy, Default)]
pub struct BasicCardRenderer;

impl PlatformRenderable<DialogflowCard> for BasicCardRenderer {
    fn render(&self, card: &Card) -> Result<DialogflowCard, ConversionError> {
        Ok(DialogflowCard {
            title: Some(card.title.clone()),
            subtitle: card.subtitle.clone().or_else(|| card.content.clone()),
            image_uri: card.image_url.clone(),
            buttons: Vec::new(),
        })
    }

    fn restore(&self, native: &DialogflowCard) -> Card {
        Card {
            subtitle: native.subtitle.clone(),
            image_url: native.image_uri.clone(),
            ..Card::new(native.title.clone().unwrap_or_default())
        }
    }
}
