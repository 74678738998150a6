//! Core platform request/response types.
//!
//! The Core platform speaks parley's own format: the response carries the
//! generic [`OutputTemplate`] as-is, so any client that understands templates
//! can render it.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use parley_types::{AppState, OutputTemplate};

use crate::converter::NativeResponse;

/// Version written into every Core response.
pub const CORE_RESPONSE_VERSION: &str = "4.0.0";

/// An inbound Core platform request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoreRequest {
    /// Protocol version of the client.
    pub version: String,
    /// Type tag of the platform the request is addressed to.
    #[serde(rename = "type")]
    pub platform_type: String,
    pub request: CoreRequestBody,
    /// Session carried over from the previous response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<CoreRequestSession>,
    /// Client context (device, user, ...), passed through untouched.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub context: Map<String, Value>,
}

/// What the user did.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoreRequestBody {
    /// Request kind, e.g. `"LAUNCH"`, `"TEXT"`, `"INTENT"`.
    #[serde(rename = "type")]
    pub request_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    /// Kind-specific body (input text, intent, ...).
    #[serde(default, skip_serializing_if = "Value::is_null")]
    pub body: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CoreRequestSession {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub data: Map<String, Value>,
    #[serde(default, rename = "new")]
    pub is_new: bool,
}

/// A Core platform response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreResponse {
    pub version: String,
    #[serde(rename = "type")]
    pub platform_type: String,
    pub output: OutputTemplate,
    pub session: CoreResponseSession,
    pub context: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreResponseSession {
    pub data: Map<String, Value>,
    pub end: bool,
}

impl Default for CoreResponse {
    fn default() -> Self {
        Self {
            version: CORE_RESPONSE_VERSION.to_owned(),
            platform_type: String::new(),
            output: OutputTemplate::default(),
            session: CoreResponseSession::default(),
            context: Map::new(),
        }
    }
}

impl NativeResponse for CoreResponse {
    fn set_platform_type(&mut self, type_tag: &str) {
        self.platform_type = type_tag.to_owned();
    }

    fn set_session(&mut self, state: &AppState) {
        self.session.data = state.session.clone();
        self.session.end = state.end_session;
    }
}
