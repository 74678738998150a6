//! JSON deep merge and key normalization utilities.
//!
//! Shared by the config resolver (defaults + caller overrides) and by the
//! output converters (native escape-hatch objects merged into a rendered
//! response).

use serde_json::Value;

/// Deep merge `overlay` into `base`.
///
/// Rules:
/// - **Objects** are recursively merged (overlay keys override base keys).
/// - **Arrays** are REPLACED (not concatenated).
/// - **Scalars** and `null`: overlay replaces base verbatim.
pub fn deep_merge(base: &mut Value, overlay: &Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(key) {
                    Some(base_value) => deep_merge(base_value, value),
                    None => {
                        base_map.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (base, overlay) => {
            *base = overlay.clone();
        }
    }
}

/// Return a merged copy of `base` and `overlay` without touching either.
pub fn merged(base: &Value, overlay: &Value) -> Value {
    let mut out = base.clone();
    deep_merge(&mut out, overlay);
    out
}

/// Recursively normalize JSON object keys from `camelCase` to `snake_case`.
///
/// For example, `"maxSize"` becomes `"max_size"` and `"textMaxLength"`
/// becomes `"text_max_length"`. Non-object values and already-snake_case
/// keys pass through unchanged.
pub fn normalize_keys(value: &mut Value) {
    match value {
        Value::Object(map) => {
            let entries: Vec<(String, Value)> = std::mem::take(map)
                .into_iter()
                .map(|(k, v)| (camel_to_snake(&k), v))
                .collect();

            for (key, mut val) in entries {
                normalize_keys(&mut val);
                map.insert(key, val);
            }
        }
        Value::Array(arr) => {
            for item in arr.iter_mut() {
                normalize_keys(item);
            }
        }
        _ => {}
    }
}

/// Convert a single `camelCase` string to `snake_case`.
///
/// Handles consecutive uppercase letters (e.g. `"HTMLParser"` -> `"html_parser"`).
pub fn camel_to_snake(s: &str) -> String {
    let mut result = String::with_capacity(s.len() + 4);
    let chars: Vec<char> = s.chars().collect();

    for (i, &ch) in chars.iter().enumerate() {
        if ch.is_uppercase() {
            if i > 0 {
                let prev_lower = chars[i - 1].is_lowercase();
                let next_lower = chars.get(i + 1).is_some_and(|c| c.is_lowercase());
                if prev_lower || next_lower {
                    result.push('_');
                }
            }
            result.extend(ch.to_lowercase());
        } else {
            result.push(ch);
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    // ── deep_merge ───────────────────────────────────────────────────

    #[test]
    fn merge_objects_recursively() {
        let mut base = json!({"a": {"x": 1, "y": 2}, "b": 10});
        let overlay = json!({"a": {"y": 3, "z": 4}, "c": 20});
        deep_merge(&mut base, &overlay);

        assert_eq!(base["a"]["x"], 1); // untouched
        assert_eq!(base["a"]["y"], 3); // overridden
        assert_eq!(base["a"]["z"], 4); // added
        assert_eq!(base["b"], 10);
        assert_eq!(base["c"], 20);
    }

    #[test]
    fn merge_arrays_replaced_not_concatenated() {
        let mut base = json!({"list": [1, 2, 3]});
        deep_merge(&mut base, &json!({"list": [4, 5]}));
        assert_eq!(base["list"], json!([4, 5]));
    }

    #[test]
    fn merge_null_replaces_value() {
        let mut base = json!({"a": 1, "b": 2});
        deep_merge(&mut base, &json!({"b": null}));
        assert_eq!(base, json!({"a": 1, "b": null}));
    }

    #[test]
    fn merge_object_replaced_by_scalar() {
        let mut base = json!({"a": {"x": 1}});
        deep_merge(&mut base, &json!({"a": "flat"}));
        assert_eq!(base["a"], "flat");
    }

    #[test]
    fn merge_empty_overlay_preserves_base() {
        let mut base = json!({"a": 1});
        deep_merge(&mut base, &json!({}));
        assert_eq!(base, json!({"a": 1}));
    }

    #[test]
    fn merged_leaves_inputs_untouched() {
        let base = json!({"a": {"x": 1}});
        let overlay = json!({"a": {"y": 2}});
        let out = merged(&base, &overlay);
        assert_eq!(out, json!({"a": {"x": 1, "y": 2}}));
        assert_eq!(base, json!({"a": {"x": 1}}));
    }

    // ── camel_to_snake / normalize_keys ──────────────────────────────

    #[test]
    fn camel_to_snake_simple() {
        assert_eq!(camel_to_snake("maxSize"), "max_size");
        assert_eq!(camel_to_snake("quickRepliesMaxSize"), "quick_replies_max_size");
        assert_eq!(camel_to_snake("already_snake"), "already_snake");
    }

    #[test]
    fn camel_to_snake_consecutive_uppercase() {
        assert_eq!(camel_to_snake("HTMLParser"), "html_parser");
        assert_eq!(camel_to_snake("imageURL"), "image_url");
    }

    #[test]
    fn normalize_nested_and_arrays() {
        let mut val = json!({"output": {"maxSize": true}, "list": [{"textMaxLength": 5}]});
        normalize_keys(&mut val);
        assert_eq!(val["output"]["max_size"], true);
        assert_eq!(val["list"][0]["text_max_length"], 5);
    }

    #[test]
    fn normalize_non_object_is_noop() {
        let mut val = json!(42);
        normalize_keys(&mut val);
        assert_eq!(val, json!(42));
    }
}
