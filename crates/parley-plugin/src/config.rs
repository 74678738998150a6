//! Config resolution: component defaults + caller-supplied partial override.
//!
//! Resolution happens in two steps:
//!
//! 1. [`resolve_value`] deep-merges the override into the default at the
//!    JSON level. Objects merge key-wise, everything else (arrays included)
//!    is replaced outright. This step never fails.
//! 2. The merged value is deserialized into the component's typed config.
//!    A merged value that does not fit the schema fails fast with
//!    [`PluginError::ConfigMerge`].
//!
//! [`resolve`] performs both steps; factories that receive an already
//! merged value use [`from_effective`] for step 2.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use parley_types::merge::{merged, normalize_keys};

use crate::error::PluginError;

/// Merge `override_value` over `default`, returning the effective config.
///
/// Idempotent: resolving the result again with an empty override returns
/// it unchanged.
pub fn resolve_value(default: &Value, override_value: &Value) -> Value {
    merged(default, override_value)
}

/// Normalize a caller override so `camelCase` keys address the same
/// fields as the `snake_case` defaults.
pub fn normalize_override(override_value: &Value) -> Value {
    let mut normalized = override_value.clone();
    normalize_keys(&mut normalized);
    normalized
}

/// Resolve a typed config from its default and a partial override.
pub fn resolve<C>(plugin: &str, default: &C, override_value: &Value) -> Result<C, PluginError>
where
    C: Serialize + DeserializeOwned,
{
    let base = serde_json::to_value(default)?;
    let effective = resolve_value(&base, &normalize_override(override_value));
    from_effective(plugin, effective)
}

/// Deserialize an already merged config value.
pub fn from_effective<C: DeserializeOwned>(plugin: &str, effective: Value) -> Result<C, PluginError> {
    serde_json::from_value(effective).map_err(|e| PluginError::ConfigMerge {
        plugin: plugin.to_owned(),
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Limits {
        max_size: Option<usize>,
        max_length: usize,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct SampleConfig {
        #[serde(rename = "type")]
        type_tag: String,
        limits: Limits,
        tags: Vec<String>,
    }

    fn sample_default() -> SampleConfig {
        SampleConfig {
            type_tag: "sample".into(),
            limits: Limits {
                max_size: Some(20),
                max_length: 255,
            },
            tags: vec!["a".into(), "b".into()],
        }
    }

    #[test]
    fn nested_mapping_keys_merge_recursively() {
        let d = json!({"a": {"x": 1, "y": 2}});
        let o = json!({"a": {"y": 9}});
        assert_eq!(resolve_value(&d, &o), json!({"a": {"x": 1, "y": 9}}));
    }

    #[test]
    fn default_keys_survive_and_override_scalars_win() {
        let d = json!({"keep": true, "swap": "old", "list": [1, 2, 3]});
        let o = json!({"swap": "new", "list": [9], "extra": 1});
        let r = resolve_value(&d, &o);
        assert_eq!(r["keep"], true);
        assert_eq!(r["swap"], "new");
        assert_eq!(r["list"], json!([9]));
        assert_eq!(r["extra"], 1);
    }

    #[test]
    fn resolution_is_idempotent() {
        let d = json!({"a": {"x": 1}, "b": [1]});
        let o = json!({"a": {"z": 2}, "b": []});
        let once = resolve_value(&d, &o);
        assert_eq!(resolve_value(&once, &json!({})), once);
    }

    #[test]
    fn typed_resolve_with_empty_override_returns_default() {
        let cfg = resolve("Sample", &sample_default(), &json!({})).unwrap();
        assert_eq!(cfg, sample_default());
    }

    #[test]
    fn typed_resolve_accepts_camel_case_keys() {
        let cfg = resolve(
            "Sample",
            &sample_default(),
            &json!({"limits": {"maxLength": 10}}),
        )
        .unwrap();
        assert_eq!(cfg.limits.max_length, 10);
        assert_eq!(cfg.limits.max_size, Some(20));
    }

    #[test]
    fn typed_resolve_null_clears_optional_field() {
        let cfg = resolve(
            "Sample",
            &sample_default(),
            &json!({"limits": {"max_size": null}}),
        )
        .unwrap();
        assert_eq!(cfg.limits.max_size, None);
    }

    #[test]
    fn typed_resolve_replaces_sequences() {
        let cfg = resolve("Sample", &sample_default(), &json!({"tags": ["z"]})).unwrap();
        assert_eq!(cfg.tags, vec!["z".to_owned()]);
    }

    #[test]
    fn malformed_override_fails_fast() {
        let err = resolve(
            "Sample",
            &sample_default(),
            &json!({"limits": {"max_length": "ten"}}),
        )
        .unwrap_err();
        match err {
            PluginError::ConfigMerge { plugin, .. } => assert_eq!(plugin, "Sample"),
            other => panic!("expected ConfigMerge, got {other:?}"),
        }
    }

    #[test]
    fn non_object_override_replaces_whole_config_and_fails() {
        let err = resolve("Sample", &sample_default(), &json!(5)).unwrap_err();
        assert!(matches!(err, PluginError::ConfigMerge { .. }));
    }
}
