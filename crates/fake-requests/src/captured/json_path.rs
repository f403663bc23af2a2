//! Dotted key lookup into decoded JSON bodies.
//!
//! `"key.inner"` reaches `{"key": {"inner": ...}}`; numeric segments index
//! into arrays (`"items.0.id"`). A literal key containing dots wins over
//! traversal when it exists at the top level.

use serde_json::Value;

pub fn lookup<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    if let Some(value) = root.as_object().and_then(|map| map.get(path)) {
        return Some(value);
    }

    path.split('.').try_fold(root, |current, segment| match current {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nested_objects() {
        let body = json!({"key": {"inner": "value"}});
        assert_eq!(lookup(&body, "key.inner"), Some(&json!("value")));
        assert_eq!(lookup(&body, "key"), Some(&json!({"inner": "value"})));
        assert_eq!(lookup(&body, "key.missing"), None);
        assert_eq!(lookup(&body, "key.inner.deeper"), None);
    }

    #[test]
    fn test_array_indices() {
        let body = json!({"items": [{"id": 1}, {"id": 2}]});
        assert_eq!(lookup(&body, "items.1.id"), Some(&json!(2)));
        assert_eq!(lookup(&body, "items.2.id"), None);
        assert_eq!(lookup(&body, "items.first"), None);
    }

    #[test]
    fn test_literal_dotted_key() {
        let body = json!({"a.b": 1, "a": {"b": 2}});
        assert_eq!(lookup(&body, "a.b"), Some(&json!(1)));
    }

    #[test]
    fn test_null_values_are_present() {
        let body = json!({"key": null});
        assert_eq!(lookup(&body, "key"), Some(&Value::Null));
    }
}
