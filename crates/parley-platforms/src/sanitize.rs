//! Sanitization policy: per-field ceilings enforced by truncation.
//!
//! Native platforms reject over-limit payloads outright, so converters cut
//! values down locally instead. Every cut is reported twice: logged with
//! `tracing::warn!` and returned as a [`ConversionWarning`].
//!
//! Two toggles guard the ceilings independently:
//!
//! - `max_size` -- the number of quick replies
//! - `max_length` -- the length (in characters) of message and quick-reply
//!   texts

use serde::{Deserialize, Serialize};
use tracing::warn;

use parley_types::{ConversionWarning, MessageValue, QuickReply, QuickReplyValue};

use crate::converter::ConverterConfig;

/// Which ceilings are enforced.
///
/// Deserializes from either a boolean (every toggle at once) or a
/// field-scoped object such as `{"max_size": false}`, where missing toggles
/// stay enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "SanitizationRepr")]
pub struct SanitizationConfig {
    pub max_size: bool,
    pub max_length: bool,
}

impl SanitizationConfig {
    pub fn all(enabled: bool) -> Self {
        Self {
            max_size: enabled,
            max_length: enabled,
        }
    }
}

impl Default for SanitizationConfig {
    fn default() -> Self {
        Self::all(true)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SanitizationRepr {
    All(bool),
    Fields {
        #[serde(default = "enabled", alias = "maxSize")]
        max_size: bool,
        #[serde(default = "enabled", alias = "maxLength")]
        max_length: bool,
    },
}

fn enabled() -> bool {
    true
}

impl From<SanitizationRepr> for SanitizationConfig {
    fn from(repr: SanitizationRepr) -> Self {
        match repr {
            SanitizationRepr::All(enabled) => Self::all(enabled),
            SanitizationRepr::Fields {
                max_size,
                max_length,
            } => Self {
                max_size,
                max_length,
            },
        }
    }
}

/// Numeric ceilings. `None` means unlimited.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SanitizationLimits {
    /// Maximum characters of a message text.
    pub text_max_length: Option<usize>,
    /// Maximum number of quick replies.
    pub quick_replies_max_size: Option<usize>,
    /// Maximum characters of one quick-reply label, and of its value.
    pub quick_reply_max_length: Option<usize>,
}

/// Truncate `text` to at most `max_length` characters.
///
/// Returns whether anything was cut. Never splits a character.
pub fn truncate_chars(text: &mut String, max_length: usize) -> bool {
    match text.char_indices().nth(max_length) {
        Some((byte_index, _)) => {
            text.truncate(byte_index);
            true
        }
        None => false,
    }
}

/// Log a warning and append it to the side channel.
pub(crate) fn emit(platform: &str, warnings: &mut Vec<ConversionWarning>, warning: ConversionWarning) {
    warn!(platform = %platform, path = %warning.path(), "{warning}");
    warnings.push(warning);
}

/// Applies one converter's sanitization policy to a single conversion,
/// collecting the warnings it raises.
#[derive(Debug)]
pub struct Sanitizer<'a> {
    platform: &'a str,
    toggles: SanitizationConfig,
    limits: SanitizationLimits,
    warnings: Vec<ConversionWarning>,
}

impl<'a> Sanitizer<'a> {
    pub fn new(platform: &'a str, config: &ConverterConfig) -> Self {
        Self {
            platform,
            toggles: config.sanitization,
            limits: config.limits,
            warnings: Vec::new(),
        }
    }

    /// Sanitized copy of a message.
    ///
    /// A structured message has both its `text` and its `displayText`
    /// checked, under `<path>.text` and `<path>.displayText`.
    pub fn message(&mut self, message: &MessageValue, path: &str) -> MessageValue {
        let mut message = message.clone();
        let Some(max_length) = self.limits.text_max_length.filter(|_| self.toggles.max_length)
        else {
            return message;
        };

        match &mut message {
            MessageValue::Text(text) => self.truncate(text, path, max_length),
            MessageValue::Structured(structured) => {
                self.truncate(&mut structured.text, &format!("{path}.text"), max_length);
                if let Some(display_text) = structured.display_text.as_mut() {
                    self.truncate(display_text, &format!("{path}.displayText"), max_length);
                }
            }
        }
        message
    }

    /// Sanitized copy of a quick-reply list.
    ///
    /// The count ceiling is applied first; the length ceiling then applies
    /// to every surviving label. A structured reply's `value` is what most
    /// platforms render, so it is held to the same ceiling under
    /// `<path>[i].value`.
    pub fn quick_replies(&mut self, replies: &[QuickReplyValue], path: &str) -> Vec<QuickReplyValue> {
        let mut replies = replies.to_vec();

        if let Some(max_size) = self.limits.quick_replies_max_size.filter(|_| self.toggles.max_size) {
            if replies.len() > max_size {
                replies.truncate(max_size);
                self.push(ConversionWarning::ArrayTruncated {
                    path: path.to_owned(),
                    max_size,
                });
            }
        }

        if let Some(max_length) = self
            .limits
            .quick_reply_max_length
            .filter(|_| self.toggles.max_length)
        {
            for (index, reply) in replies.iter_mut().enumerate() {
                let reply_path = format!("{path}[{index}]");
                self.truncate(reply.text_mut(), &reply_path, max_length);
                if let QuickReplyValue::Structured(QuickReply {
                    value: Some(value), ..
                }) = reply
                {
                    self.truncate(value, &format!("{reply_path}.value"), max_length);
                }
            }
        }

        replies
    }

    fn truncate(&mut self, text: &mut String, path: &str, max_length: usize) {
        if truncate_chars(text, max_length) {
            self.push(ConversionWarning::StringTruncated {
                path: path.to_owned(),
                max_length,
            });
        }
    }

    fn push(&mut self, warning: ConversionWarning) {
        emit(self.platform, &mut self.warnings, warning);
    }

    /// The warnings raised so far.
    pub fn into_warnings(self) -> Vec<ConversionWarning> {
        self.warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_types::Message;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn config(toggles: SanitizationConfig) -> ConverterConfig {
        ConverterConfig {
            sanitization: toggles,
            limits: SanitizationLimits {
                text_max_length: Some(255),
                quick_replies_max_size: Some(10),
                quick_reply_max_length: Some(20),
            },
        }
    }

    fn replies(n: usize) -> Vec<QuickReplyValue> {
        (0..n).map(|i| QuickReplyValue::from(format!("reply {i}"))).collect()
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        let mut text = "héllo wörld".to_owned();
        assert!(truncate_chars(&mut text, 7));
        assert_eq!(text, "héllo w");

        let mut short = "ok".to_owned();
        assert!(!truncate_chars(&mut short, 2));
        assert_eq!(short, "ok");
    }

    #[test]
    fn quick_replies_over_ceiling_are_cut_with_one_warning() {
        let cfg = config(SanitizationConfig::default());
        let mut sanitizer = Sanitizer::new("Test", &cfg);
        let out = sanitizer.quick_replies(&replies(12), "quickReplies");

        assert_eq!(out.len(), 10);
        assert_eq!(
            sanitizer.into_warnings(),
            vec![ConversionWarning::ArrayTruncated {
                path: "quickReplies".into(),
                max_size: 10,
            }]
        );
    }

    #[test]
    fn long_message_is_cut_to_ceiling() {
        let cfg = config(SanitizationConfig::default());
        let mut sanitizer = Sanitizer::new("Test", &cfg);
        let out = sanitizer.message(&MessageValue::from("a".repeat(300)), "message");

        assert_eq!(out.text().chars().count(), 255);
        assert_eq!(
            sanitizer.into_warnings(),
            vec![ConversionWarning::StringTruncated {
                path: "message".into(),
                max_length: 255,
            }]
        );
    }

    #[test]
    fn disabled_max_length_leaves_text_alone() {
        let cfg = config(SanitizationConfig {
            max_size: true,
            max_length: false,
        });
        let mut sanitizer = Sanitizer::new("Test", &cfg);
        let out = sanitizer.message(&MessageValue::from("a".repeat(300)), "message");

        assert_eq!(out.text().len(), 300);
        assert!(sanitizer.into_warnings().is_empty());
    }

    #[test]
    fn toggles_are_independent() {
        let cfg = config(SanitizationConfig {
            max_size: false,
            max_length: true,
        });
        let long = QuickReplyValue::from("this label is definitely too long");
        let mut input = replies(11);
        input.push(long);

        let mut sanitizer = Sanitizer::new("Test", &cfg);
        let out = sanitizer.quick_replies(&input, "quickReplies");

        assert_eq!(out.len(), 12);
        assert_eq!(out[11].text(), "this label is defini");
        assert_eq!(
            sanitizer.into_warnings(),
            vec![ConversionWarning::StringTruncated {
                path: "quickReplies[11]".into(),
                max_length: 20,
            }]
        );
    }

    #[test]
    fn structured_values_are_sanitized_in_place() {
        let cfg = config(SanitizationConfig::default());
        let mut sanitizer = Sanitizer::new("Test", &cfg);

        let message = MessageValue::Structured(Message {
            text: "b".repeat(256),
            display_text: Some("short".into()),
        });
        let out = sanitizer.message(&message, "platforms.Test.message");
        assert_eq!(out.text().len(), 255);
        assert_eq!(out.display_text(), "short");

        let reply = QuickReplyValue::Structured(QuickReply {
            text: "x".repeat(25),
            value: Some("payload".into()),
        });
        let out = sanitizer.quick_replies(&[reply], "quickReplies");
        assert_eq!(out[0].text().len(), 20);
        assert_eq!(out[0].payload(), "payload");

        let paths: Vec<_> = sanitizer
            .into_warnings()
            .iter()
            .map(|w| w.path().to_owned())
            .collect();
        assert_eq!(paths, vec!["platforms.Test.message.text", "quickReplies[0]"]);
    }

    #[test]
    fn long_quick_reply_value_is_cut_too() {
        let cfg = config(SanitizationConfig::default());
        let mut sanitizer = Sanitizer::new("Test", &cfg);
        let reply = QuickReplyValue::Structured(QuickReply {
            text: "Yes".into(),
            value: Some("y".repeat(30)),
        });

        let out = sanitizer.quick_replies(&[reply], "quickReplies");

        assert_eq!(out[0].text(), "Yes");
        assert_eq!(out[0].payload(), "y".repeat(20));
        assert_eq!(
            sanitizer.into_warnings(),
            vec![ConversionWarning::StringTruncated {
                path: "quickReplies[0].value".into(),
                max_length: 20,
            }]
        );
    }

    #[test]
    fn unlimited_ceilings_never_warn() {
        let cfg = ConverterConfig::default();
        let mut sanitizer = Sanitizer::new("Test", &cfg);
        sanitizer.quick_replies(&replies(100), "quickReplies");
        sanitizer.message(&MessageValue::from("a".repeat(10_000)), "message");
        assert!(sanitizer.into_warnings().is_empty());
    }

    #[test]
    fn config_accepts_bool_or_fields() {
        let all_off: SanitizationConfig = serde_json::from_value(json!(false)).unwrap();
        assert_eq!(all_off, SanitizationConfig::all(false));

        let partial: SanitizationConfig =
            serde_json::from_value(json!({"maxSize": false})).unwrap();
        assert_eq!(
            partial,
            SanitizationConfig {
                max_size: false,
                max_length: true,
            }
        );

        assert_eq!(
            serde_json::to_value(SanitizationConfig::default()).unwrap(),
            json!({"max_size": true, "max_length": true})
        );
    }
}
