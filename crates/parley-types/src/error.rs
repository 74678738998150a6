//! Error types for output conversion.
//!
//! [`ConversionError`] is non-exhaustive so platforms can grow new failure
//! modes without breaking downstream matches.

use thiserror::Error;

/// Errors produced while converting between generic output and a native
/// platform payload.
///
/// Most conversion problems never surface as an `Err`: converters degrade
/// an unsupported field into a [`ConversionWarning`](crate::ConversionWarning)
/// and keep going. Only whole-payload failures (an inbound document that is
/// not the platform's shape at all) are returned to the caller.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ConversionError {
    /// The platform has no native mapping for a value of this kind.
    #[error("{platform} cannot render {kind}")]
    UnsupportedConversion {
        /// Platform name (e.g. `"Dialogflow"`).
        platform: String,
        /// Human-readable value kind (e.g. `"card of type 'carousel'"`).
        kind: String,
    },

    /// A native payload did not match the platform's schema.
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    /// JSON serialization / deserialization error.
    #[error("json error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ConversionError {
    /// Shorthand for [`ConversionError::UnsupportedConversion`].
    pub fn unsupported(platform: impl Into<String>, kind: impl Into<String>) -> Self {
        Self::UnsupportedConversion {
            platform: platform.into(),
            kind: kind.into(),
        }
    }
}

/// A convenience alias used throughout the conversion layer.
pub type Result<T> = std::result::Result<T, ConversionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_display() {
        let err = ConversionError::unsupported("Dialogflow", "card of type 'carousel'");
        assert_eq!(
            err.to_string(),
            "Dialogflow cannot render card of type 'carousel'"
        );
    }

    #[test]
    fn invalid_payload_display() {
        let err = ConversionError::InvalidPayload("missing queryResult".into());
        assert_eq!(err.to_string(), "invalid payload: missing queryResult");
    }

    #[test]
    fn from_serde_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{{bad}}").unwrap_err();
        let err: ConversionError = json_err.into();
        assert!(matches!(err, ConversionError::Serialization(_)));
    }
}
