//! Conversion results and the warning side channel.
//!
//! Converters never fail a request because one field is over a platform
//! limit or has no native mapping. They degrade (truncate or omit) and
//! report what they did as [`ConversionWarning`] values alongside the
//! converted payload.

use std::fmt;

use serde::Serialize;

/// A degradation applied while converting one payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConversionWarning {
    /// A sequence was cut down to `max_size` elements.
    ArrayTruncated { path: String, max_size: usize },
    /// A string was cut down to `max_length` characters.
    StringTruncated { path: String, max_length: usize },
    /// A field was left out because it could not be converted.
    Omitted { path: String, reason: String },
}

impl ConversionWarning {
    /// Field path the warning refers to (e.g. `quickReplies[3]`).
    pub fn path(&self) -> &str {
        match self {
            Self::ArrayTruncated { path, .. }
            | Self::StringTruncated { path, .. }
            | Self::Omitted { path, .. } => path,
        }
    }
}

impl fmt::Display for ConversionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ArrayTruncated { path, max_size } => {
                write!(f, "{path} was truncated to {max_size} elements")
            }
            Self::StringTruncated { path, max_length } => {
                write!(f, "{path} was truncated to {max_length} characters")
            }
            Self::Omitted { path, reason } => write!(f, "{path} was omitted: {reason}"),
        }
    }
}

/// A converted payload together with the warnings raised producing it.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversion<R> {
    pub response: R,
    pub warnings: Vec<ConversionWarning>,
}

impl<R> Conversion<R> {
    pub fn new(response: R, warnings: Vec<ConversionWarning>) -> Self {
        Self { response, warnings }
    }

    /// Transform the payload, keeping the warnings.
    pub fn map<T>(self, f: impl FnOnce(R) -> T) -> Conversion<T> {
        Conversion {
            response: f(self.response),
            warnings: self.warnings,
        }
    }

    /// Fallible [`map`](Self::map).
    pub fn try_map<T, E>(self, f: impl FnOnce(R) -> Result<T, E>) -> Result<Conversion<T>, E> {
        Ok(Conversion {
            response: f(self.response)?,
            warnings: self.warnings,
        })
    }

    pub fn into_response(self) -> R {
        self.response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn warning_display() {
        let w = ConversionWarning::ArrayTruncated {
            path: "quickReplies".into(),
            max_size: 10,
        };
        assert_eq!(w.to_string(), "quickReplies was truncated to 10 elements");

        let w = ConversionWarning::StringTruncated {
            path: "quickReplies[2]".into(),
            max_length: 20,
        };
        assert_eq!(w.path(), "quickReplies[2]");
        assert_eq!(w.to_string(), "quickReplies[2] was truncated to 20 characters");
    }

    #[test]
    fn warning_serializes_with_kind_tag() {
        let w = ConversionWarning::Omitted {
            path: "card".into(),
            reason: "no renderer".into(),
        };
        assert_eq!(
            serde_json::to_value(&w).unwrap(),
            json!({"kind": "omitted", "path": "card", "reason": "no renderer"})
        );
    }

    #[test]
    fn map_keeps_warnings() {
        let conv = Conversion::new(2, vec![ConversionWarning::Omitted {
            path: "card".into(),
            reason: "x".into(),
        }]);
        let mapped = conv.map(|n| n * 10);
        assert_eq!(mapped.response, 20);
        assert_eq!(mapped.warnings.len(), 1);
    }
}
