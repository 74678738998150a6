//! Application state copied into native responses on finalization.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Session-relevant state of the running application for one turn.
///
/// Platforms copy this into their native session carrier when a response
/// is finalized, so the next request of the conversation brings it back.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppState {
    /// Opaque session data persisted across turns.
    #[serde(default)]
    pub session: Map<String, Value>,

    /// Whether the application ends the session with this response.
    #[serde(default)]
    pub end_session: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter for one session entry.
    pub fn with_session_value(mut self, key: impl Into<String>, value: Value) -> Self {
        self.session.insert(key.into(), value);
        self
    }

    /// Session data as a JSON object value.
    pub fn session_value(&self) -> Value {
        Value::Object(self.session.clone())
    }
}
