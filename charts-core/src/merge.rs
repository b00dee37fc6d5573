//! Recursive merge of option trees.

use serde_json::Value;

/// Merge `overrides` into `base`.
///
/// Where both sides hold a JSON object the merge recurses key by key. Any
/// other value in `overrides`, arrays included, replaces the base value
/// wholesale. Keys only present in `base` are kept.
#[must_use]
pub fn deep_merge(base: Value, overrides: &Value) -> Value {
    match (base, overrides) {
        (Value::Object(mut base_map), Value::Object(override_map)) => {
            for (key, override_value) in override_map {
                let merged = match base_map.remove(key) {
                    Some(base_value) => deep_merge(base_value, override_value),
                    None => override_value.clone(),
                };
                base_map.insert(key.clone(), merged);
            }
            Value::Object(base_map)
        }
        (_, replacement) => replacement.clone(),
    }
}
