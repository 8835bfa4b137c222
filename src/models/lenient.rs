//! Field extraction for loosely-typed upstream objects.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Take `key` out of `map` if it parses as `T`.
///
/// Values that are absent, null or of another type stay in the map untouched, so
/// they still reach the client verbatim through the flattened `extra` field.
pub(crate) fn take<T: DeserializeOwned>(map: &mut Map<String, Value>, key: &str) -> Option<T> {
    let parsed = match map.get(key) {
        None | Some(Value::Null) => return None,
        Some(value) => serde_json::from_value::<T>(value.clone()).ok()?,
    };
    map.remove(key);
    Some(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_take_matching_type() {
        let mut map = json!({"title": "A", "n": 3}).as_object().cloned().unwrap();
        assert_eq!(take::<String>(&mut map, "title"), Some("A".to_string()));
        assert_eq!(take::<i64>(&mut map, "n"), Some(3));
        assert!(map.is_empty());
    }

    #[test]
    fn test_take_mismatch_keeps_raw_value() {
        let mut map = json!({"bench": ["x"], "gone": null}).as_object().cloned().unwrap();
        assert_eq!(take::<Vec<i64>>(&mut map, "bench"), None);
        assert_eq!(take::<String>(&mut map, "gone"), None);
        assert_eq!(take::<String>(&mut map, "missing"), None);
        assert_eq!(map.get("bench"), Some(&json!(["x"])));
        assert_eq!(map.get("gone"), Some(&Value::Null));
    }
}
