//! The output converter contract.
//!
//! An [`OutputConverterStrategy`] maps a generic [`OutputTemplate`] to one
//! platform's native response and back. Platforms own a strategy value
//! rather than inheriting conversion logic, so a new platform is a new
//! strategy, not a new type hierarchy.
//!
//! Conversion runs in a fixed order:
//!
//! 1. resolve the effective fields (platform override over generic value)
//! 2. sanitize the effective message and quick replies
//! 3. let the strategy [`render`](OutputConverterStrategy::render) the
//!    native structure
//! 4. deep-merge the platform's native escape hatch into the result

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use parley_types::merge::deep_merge;
use parley_types::{
    AppState, Card, Conversion, ConversionWarning, ListenValue, MessageValue, OutputTemplate,
    QuickReplyValue,
};

use crate::prepare::merge_templates;
use crate::sanitize::{SanitizationConfig, SanitizationLimits, Sanitizer, emit};

/// Configuration every converter carries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConverterConfig {
    pub sanitization: SanitizationConfig,
    pub limits: SanitizationLimits,
}

/// A platform's native response document.
pub trait NativeResponse:
    Serialize + DeserializeOwned + Default + Clone + Send + Sync + 'static
{
    /// Stamp the platform's type tag.
    fn set_platform_type(&mut self, type_tag: &str);

    /// Copy session-relevant application state into the session carrier.
    fn set_session(&mut self, state: &AppState);
}

/// Stamp the type tag and session state onto a converted response.
pub fn finalize_response<R: NativeResponse>(mut response: R, type_tag: &str, state: &AppState) -> R {
    response.set_platform_type(type_tag);
    response.set_session(state);
    response
}

/// The fields a strategy renders, after override resolution and
/// sanitization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResolvedOutput {
    pub message: Option<MessageValue>,
    pub reprompt: Option<MessageValue>,
    pub listen: Option<ListenValue>,
    pub quick_replies: Option<Vec<QuickReplyValue>>,
    pub card: Option<Card>,
    pub native_response: Option<Value>,
    platform: String,
    overridden: Vec<&'static str>,
}

impl ResolvedOutput {
    /// Resolve `output` for `platform`, sanitizing as configured.
    pub fn resolve(
        output: &OutputTemplate,
        platform: &str,
        config: &ConverterConfig,
    ) -> Conversion<Self> {
        let effective = output.effective(platform);
        let overridden = output
            .platform(platform)
            .map(|p| {
                [
                    ("message", p.message.is_some()),
                    ("reprompt", p.reprompt.is_some()),
                    ("listen", p.listen.is_some()),
                    ("quickReplies", p.quick_replies.is_some()),
                    ("card", p.card.is_some()),
                    ("nativeResponse", p.native_response.is_some()),
                ]
                .into_iter()
                .filter_map(|(field, set)| set.then_some(field))
                .collect()
            })
            .unwrap_or_default();

        let mut resolved = Self {
            platform: platform.to_owned(),
            overridden,
            ..Self::default()
        };

        let mut sanitizer = Sanitizer::new(platform, config);
        resolved.message = effective
            .message
            .map(|m| sanitizer.message(m, &resolved.path("message")));
        resolved.reprompt = effective
            .reprompt
            .map(|m| sanitizer.message(m, &resolved.path("reprompt")));
        resolved.quick_replies = effective
            .quick_replies
            .map(|q| sanitizer.quick_replies(q, &resolved.path("quickReplies")));
        resolved.listen = effective.listen.cloned();
        resolved.card = effective.card.cloned();
        resolved.native_response = effective.native_response.cloned();

        let warnings = sanitizer.into_warnings();
        Conversion::new(resolved, warnings)
    }

    /// Platform the output was resolved for.
    pub fn platform(&self) -> &str {
        &self.platform
    }

    /// Template path of `field` as the caller wrote it: under
    /// `platforms.<name>` when the value came from the override.
    pub fn path(&self, field: &str) -> String {
        if self.overridden.iter().any(|f| *f == field) {
            format!("platforms.{}.{field}", self.platform)
        } else {
            field.to_owned()
        }
    }
}

/// Converts generic output to one platform's native response and back.
///
/// Implementors provide the platform-specific structure through
/// [`render`](Self::render) and [`from_response`](Self::from_response);
/// override resolution, sanitization and the native escape hatch are shared.
/// Both directions are synchronous and keep no state between calls.
pub trait OutputConverterStrategy: Send + Sync + 'static {
    type Response: NativeResponse;

    /// Key of this platform's block in [`OutputTemplate::platforms`].
    fn platform_name(&self) -> &str;

    fn config(&self) -> &ConverterConfig;

    /// Build the native structure from resolved, sanitized fields.
    ///
    /// Fields that cannot be rendered are left out and reported through
    /// `warnings`; rendering never fails.
    fn render(
        &self,
        output: &ResolvedOutput,
        warnings: &mut Vec<ConversionWarning>,
    ) -> Self::Response;

    /// Reconstruct a generic template from a native response.
    fn from_response(&self, response: &Self::Response) -> OutputTemplate;

    /// Merge the templates produced for one turn into one.
    fn prepare_output(&self, outputs: &[OutputTemplate]) -> OutputTemplate {
        merge_templates(outputs)
    }

    /// Convert `output`, returning the native response and every warning
    /// raised on the way.
    fn convert(&self, output: &OutputTemplate) -> Conversion<Self::Response> {
        let platform = self.platform_name();
        let Conversion {
            response: resolved,
            mut warnings,
        } = ResolvedOutput::resolve(output, platform, self.config());

        let mut response = self.render(&resolved, &mut warnings);
        if let Some(native) = &resolved.native_response {
            let path = resolved.path("nativeResponse");
            response = merge_native(response, native, &path, platform, &mut warnings);
        }
        Conversion::new(response, warnings)
    }

    /// [`convert`](Self::convert), dropping the warnings.
    fn to_response(&self, output: &OutputTemplate) -> Self::Response {
        self.convert(output).into_response()
    }
}

/// Deep-merge a raw native fragment into a typed response.
///
/// A fragment that leaves the response unreadable as `R` is dropped with an
/// [`ConversionWarning::Omitted`] and the response is returned unmerged.
fn merge_native<R: NativeResponse>(
    response: R,
    native: &Value,
    path: &str,
    platform: &str,
    warnings: &mut Vec<ConversionWarning>,
) -> R {
    let merged = serde_json::to_value(&response).and_then(|mut value| {
        deep_merge(&mut value, native);
        serde_json::from_value::<R>(value)
    });
    match merged {
        Ok(merged) => merged,
        Err(e) => {
            emit(
                platform,
                warnings,
                ConversionWarning::Omitted {
                    path: path.to_owned(),
                    reason: e.to_string(),
                },
            );
            response
        }
    }
}
