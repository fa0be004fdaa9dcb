//! Children keyed by player id.
//!
//! The realtime database returns an object whose keys are all small integers
//! as an array, with `null` at the indices that have no child. Players named
//! `1`, `2`, `3` therefore come back as `[null, .., .., ..]`.

use serde::de::{Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use serde_json::Value;
use std::fmt;
use std::marker::PhantomData;

/// Deserialize player-keyed children from either shape, in store order
pub fn keyed_entries<'de, D, V>(deserializer: D) -> Result<Vec<(String, V)>, D::Error>
where
    D: Deserializer<'de>,
    V: Deserialize<'de>,
{
    struct EntriesVisitor<V>(PhantomData<V>);

    impl<'de, V: Deserialize<'de>> Visitor<'de> for EntriesVisitor<V> {
        type Value = Vec<(String, V)>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a map keyed by player, or an array indexed by player")
        }

        fn visit_map<M: MapAccess<'de>>(self, mut access: M) -> Result<Self::Value, M::Error> {
            let mut entries = Vec::new();
            while let Some(entry) = access.next_entry::<String, V>()? {
                entries.push(entry);
            }
            Ok(entries)
        }

        fn visit_seq<S: SeqAccess<'de>>(self, mut access: S) -> Result<Self::Value, S::Error> {
            let mut entries = Vec::new();
            let mut index = 0usize;
            while let Some(child) = access.next_element::<Option<V>>()? {
                if let Some(child) = child {
                    entries.push((index.to_string(), child));
                }
                index += 1;
            }
            Ok(entries)
        }
    }

    deserializer.deserialize_any(EntriesVisitor(PhantomData))
}

/// Keys of a stored object or array-shaped object, in store order
pub fn child_keys(value: Option<&Value>) -> Vec<String> {
    match value {
        Some(Value::Object(map)) => map.keys().cloned().collect(),
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .filter(|(_, item)| !item.is_null())
            .map(|(index, _)| index.to_string())
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn entries(value: Value) -> Vec<(String, u64)> {
        keyed_entries(value).unwrap()
    }

    #[test]
    fn test_map_keeps_order() {
        assert_eq!(
            entries(json!({"zoe": 2, "adam": 1})),
            vec![("zoe".to_string(), 2), ("adam".to_string(), 1)]
        );
    }

    #[test]
    fn test_array_uses_indices_and_skips_holes() {
        assert_eq!(
            entries(json!([null, 3, null, 1])),
            vec![("1".to_string(), 3), ("3".to_string(), 1)]
        );
    }

    #[test]
    fn test_rejects_scalars() {
        assert!(keyed_entries::<_, u64>(json!("nope")).is_err());
    }

    #[test]
    fn test_child_keys() {
        assert_eq!(child_keys(Some(&json!({"b": true, "a": true}))), vec!["b", "a"]);
        assert_eq!(child_keys(Some(&json!([null, true, true]))), vec!["1", "2"]);
        assert!(child_keys(Some(&json!("x"))).is_empty());
        assert!(child_keys(None).is_empty());
    }
}
