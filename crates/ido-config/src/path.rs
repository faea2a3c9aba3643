/*
 * path.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Dot-path traversal over JSON value trees.
//!
//! A path component addresses a mapping entry by key, or a sequence element
//! by decimal index. A component that meets a scalar, a missing key or an
//! out-of-range index ends the traversal: the path simply does not exist.

use serde_json::{Map, Value};

/// Split a dot path into its components.
pub fn split(path: &str) -> impl Iterator<Item = &str> {
    path.split('.')
}

/// Parse `segment` as an index into a sequence of length `len`.
pub fn index_in(segment: &str, len: usize) -> Option<usize> {
    segment.parse::<usize>().ok().filter(|i| *i < len)
}

/// Step from a value to one of its children.
pub fn child<'v>(value: &'v Value, segment: &str) -> Option<&'v Value> {
    match value {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => index_in(segment, items.len()).map(|i| &items[i]),
        _ => None,
    }
}

/// Look up a path below a value.
pub fn lookup<'v, 'p>(
    root: &'v Value,
    segments: impl IntoIterator<Item = &'p str>,
) -> Option<&'v Value> {
    segments
        .into_iter()
        .try_fold(root, |current, segment| child(current, segment))
}

/// Look up a path below a mapping.
///
/// An empty path yields `None`: a mapping is not itself a value here.
pub fn lookup_in<'v, 'p>(
    map: &'v Map<String, Value>,
    segments: impl IntoIterator<Item = &'p str>,
) -> Option<&'v Value> {
    let mut segments = segments.into_iter();
    let first = map.get(segments.next()?)?;
    lookup(first, segments)
}

/// Mutable counterpart of [`child`].
pub fn child_mut<'v>(value: &'v mut Value, segment: &str) -> Option<&'v mut Value> {
    match value {
        Value::Object(map) => map.get_mut(segment),
        Value::Array(items) => {
            let index = index_in(segment, items.len())?;
            Some(&mut items[index])
        }
        _ => None,
    }
}

/// Step into `container` for assignment, creating what is missing.
///
/// An in-range index into a sequence steps into that element. Otherwise a
/// container that is not a mapping is replaced by an empty one, and a
/// missing key is inserted with a null value.
pub fn slot<'v>(container: &'v mut Value, segment: &str) -> &'v mut Value {
    let index = match &*container {
        Value::Array(items) => index_in(segment, items.len()),
        _ => None,
    };
    if index.is_none() && !container.is_object() {
        *container = Value::Null;
    }

    match (container, index) {
        (Value::Array(items), Some(i)) => &mut items[i],
        // Indexing a null or a mapping by key inserts the key as needed
        (container, _) => &mut container[segment],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lookup_nested() {
        let value = json!({"foo": {"bar": {"baz": "value"}}});
        assert_eq!(lookup(&value, split("foo.bar.baz")), Some(&json!("value")));
        assert_eq!(lookup(&value, split("foo.bar.nope")), None);
        assert_eq!(lookup(&value, split("foo.bar.baz.deeper")), None);
    }

    #[test]
    fn test_lookup_sequences() {
        let value = json!({"items": [{"name": "a"}, {"name": "b"}]});
        assert_eq!(lookup(&value, split("items.1.name")), Some(&json!("b")));
        assert_eq!(lookup(&value, split("items.2.name")), None);
        assert_eq!(lookup(&value, split("items.x")), None);
    }

    #[test]
    fn test_lookup_in_map() {
        let value = json!({"a": {"b": 1}});
        let map = value.as_object().unwrap();
        assert_eq!(lookup_in(map, split("a.b")), Some(&json!(1)));
        assert_eq!(lookup_in(map, std::iter::empty()), None);
    }

    #[test]
    fn test_slot_creates_mappings() {
        let mut value = json!({"a": "scalar"});
        *slot(slot(&mut value, "a"), "b") = json!(1);
        assert_eq!(value, json!({"a": {"b": 1}}));
    }

    #[test]
    fn test_slot_steps_into_sequence() {
        let mut value = json!([1, 2, 3]);
        *slot(&mut value, "1") = json!("two");
        assert_eq!(value, json!([1, "two", 3]));
    }

    #[test]
    fn test_slot_replaces_sequence_for_bad_index() {
        let mut value = json!([1, 2, 3]);
        *slot(&mut value, "7") = json!(true);
        assert_eq!(value, json!({"7": true}));
    }
}
