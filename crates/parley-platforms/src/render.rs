//! Card renderers.
//!
//! Each platform keeps a [`RendererRegistry`] mapping a card kind to the
//! [`PlatformRenderable`] that turns it into the platform's native card. A
//! card whose kind has no renderer cannot be converted; the converter drops
//! it and records a warning.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parley_types::output::DEFAULT_CARD_KIND;
use parley_types::{Card, ConversionError};

/// Renders generic cards of one kind into the native card type `N`.
pub trait PlatformRenderable<N>: Send + Sync {
    fn render(&self, card: &Card) -> Result<N, ConversionError>;

    /// Reconstruct a generic card from its native rendering.
    fn restore(&self, native: &N) -> Card;
}

/// Renderers for one platform, keyed by card kind.
pub struct RendererRegistry<N> {
    platform: String,
    renderers: HashMap<String, Arc<dyn PlatformRenderable<N>>>,
}

impl<N> RendererRegistry<N> {
    pub fn new(platform: impl Into<String>) -> Self {
        Self {
            platform: platform.into(),
            renderers: HashMap::new(),
        }
    }

    /// Register `renderer` for `kind`, replacing any previous one.
    pub fn register(&mut self, kind: impl Into<String>, renderer: Arc<dyn PlatformRenderable<N>>) {
        self.renderers.insert(kind.into(), renderer);
    }

    /// Builder form of [`register`](Self::register).
    pub fn with(mut self, kind: impl Into<String>, renderer: Arc<dyn PlatformRenderable<N>>) -> Self {
        self.register(kind, renderer);
        self
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.renderers.contains_key(kind)
    }

    /// Registered kinds, sorted.
    pub fn kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<_> = self.renderers.keys().map(String::as_str).collect();
        kinds.sort_unstable();
        kinds
    }

    /// Render `card` with the renderer registered for its kind.
    pub fn render(&self, card: &Card) -> Result<N, ConversionError> {
        let kind = card.kind();
        match self.renderers.get(kind) {
            Some(renderer) => renderer.render(card),
            None => Err(ConversionError::unsupported(
                &self.platform,
                format!("card of type '{kind}'"),
            )),
        }
    }

    /// Restore a native card through the default-kind renderer.
    pub fn restore(&self, native: &N) -> Option<Card> {
        self.renderers
            .get(DEFAULT_CARD_KIND)
            .map(|renderer| renderer.restore(native))
    }
}

impl<N> Clone for RendererRegistry<N> {
    fn clone(&self) -> Self {
        Self {
            platform: self.platform.clone(),
            renderers: self.renderers.clone(),
        }
    }
}

impl<N> fmt::Debug for RendererRegistry<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RendererRegistry")
            .field("platform", &self.platform)
            .field("kinds", &self.kinds())
            .finish()
    }
}
