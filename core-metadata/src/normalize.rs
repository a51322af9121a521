//! Canonical normalization of metadata values.
//!
//! Remote metadata and locally recomputed metadata may differ only in key
//! ordering, list ordering, or the presence of empty placeholders. Normalizing
//! both sides before comparison makes such differences invisible without
//! discarding content.
//!
//! The rules:
//! - `null` and empty/whitespace strings normalize to absent
//! - strings are trimmed
//! - arrays are element-normalized, absent elements dropped, and the rest
//!   sorted by their canonical key so list order does not matter
//! - objects are value-normalized, keys with absent values dropped, and an
//!   emptied object is itself absent
//! - booleans and numbers pass through unchanged
//!
//! Normalization is idempotent: applying it twice yields the same value.

use serde_json::Value;

/// Deterministic string form of a value, used as a sort key for array
/// elements and as the unit of set-comparison in the differ.
///
/// `serde_json`'s default map implementation keeps keys ordered, so plain
/// serialization is already canonical for objects.
pub fn canonical_key(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Normalize a metadata value into its canonical comparable form.
///
/// Returns `None` when the value normalizes to absent (null, empty string,
/// emptied object).
pub fn normalize(value: &Value) -> Option<Value> {
    match value {
        Value::Null => None,
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(Value::String(trimmed.to_string()))
            }
        }
        Value::Array(items) => {
            let mut normalized: Vec<Value> = items.iter().filter_map(normalize).collect();
            normalized.sort_by_key(canonical_key);
            Some(Value::Array(normalized))
        }
        Value::Object(map) => {
            let mut normalized = serde_json::Map::new();
            for (key, item) in map {
                if let Some(value) = normalize(item) {
                    normalized.insert(key.clone(), value);
                }
            }
            if normalized.is_empty() {
                None
            } else {
                Some(Value::Object(normalized))
            }
        }
        other => Some(other.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_null_and_empty_string_are_absent() {
        assert_eq!(normalize(&Value::Null), None);
        assert_eq!(normalize(&json!("")), None);
        assert_eq!(normalize(&json!("   ")), None);
    }

    #[test]
    fn test_string_is_trimmed() {
        assert_eq!(normalize(&json!("  Foo ")), Some(json!("Foo")));
    }

    #[test]
    fn test_scalars_pass_through() {
        assert_eq!(normalize(&json!(42)), Some(json!(42)));
        assert_eq!(normalize(&json!(true)), Some(json!(true)));
    }

    #[test]
    fn test_array_drops_absent_and_sorts() {
        let value = json!(["b", "", "a", null]);
        assert_eq!(normalize(&value), Some(json!(["a", "b"])));
    }

    #[test]
    fn test_array_of_objects_sorted_by_canonical_key() {
        let a = json!([{"name": "Doe"}, {"name": "Abel"}]);
        let b = json!([{"name": "Abel"}, {"name": "Doe"}]);
        assert_eq!(normalize(&a), normalize(&b));
    }

    #[test]
    fn test_object_drops_empty_values() {
        let value = json!({"title": "Foo", "shelfmark": "", "license": null});
        assert_eq!(normalize(&value), Some(json!({"title": "Foo"})));
    }

    #[test]
    fn test_emptied_object_is_absent() {
        let value = json!({"a": "", "b": null, "c": {"d": "  "}});
        assert_eq!(normalize(&value), None);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let values = vec![
            json!({"title": " Foo ", "people": [{"name": "b"}, {"name": "a"}], "empty": ""}),
            json!(["x", "", "y", {"k": null}]),
            json!("  padded "),
            json!(3.5),
            Value::Null,
        ];
        for value in values {
            let once = normalize(&value);
            let twice = once.as_ref().and_then(normalize);
            assert_eq!(once, twice, "normalize not idempotent for {value}");
        }
    }
}
