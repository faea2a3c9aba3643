/*
 * merge.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Deep merging of configuration trees.
//!
//! For each incoming key: when both sides hold mappings they are merged
//! recursively, otherwise the incoming value replaces the existing one.
//! Sequences are replaced, not concatenated.

use crate::path;
use serde_json::{Map, Value};

/// Merge `incoming` into `target` in place.
pub fn merge_maps(target: &mut Map<String, Value>, incoming: Map<String, Value>) {
    for (key, value) in incoming {
        match value {
            Value::Object(incoming_map) => match target.get_mut(&key) {
                Some(Value::Object(existing)) => merge_maps(existing, incoming_map),
                _ => {
                    target.insert(key, Value::Object(incoming_map));
                }
            },
            other => {
                target.insert(key, other);
            }
        }
    }
}

/// Expand dotted top-level keys into nested mappings.
///
/// `{"foo.bar": 1, "baz": 2}` becomes `{"foo": {"bar": 1}, "baz": 2}`.
/// Only the top level is expanded: nested keys such as CSS selectors keep
/// their dots. Expanded entries are merged with each other, so
/// `{"a.x": 1, "a.y": 2}` yields `{"a": {"x": 1, "y": 2}}`.
pub fn expand_dotted_keys(data: Map<String, Value>) -> Map<String, Value> {
    let mut expanded = Map::new();
    for (key, value) in data {
        if !key.contains('.') {
            let mut single = Map::new();
            single.insert(key, value);
            merge_maps(&mut expanded, single);
            continue;
        }

        let mut nested = Value::Null;
        let mut cursor = &mut nested;
        for segment in path::split(&key) {
            cursor = path::slot(cursor, segment);
        }
        *cursor = value;

        if let Value::Object(nested) = nested {
            merge_maps(&mut expanded, nested);
        }
    }
    expanded
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(m) => m,
            _ => panic!("expected a mapping"),
        }
    }

    #[test]
    fn test_merge_adds_and_overwrites() {
        let mut target = map(json!({"initial": "value", "keep": 1}));
        merge_maps(
            &mut target,
            map(json!({"initial": "overwritten", "new": true})),
        );
        assert_eq!(
            Value::Object(target),
            json!({"initial": "overwritten", "keep": 1, "new": true})
        );
    }

    #[test]
    fn test_merge_recurses_into_mappings() {
        let mut target = map(json!({"a": {"x": 1}}));
        merge_maps(&mut target, map(json!({"a": {"y": 2}})));
        assert_eq!(Value::Object(target), json!({"a": {"x": 1, "y": 2}}));
    }

    #[test]
    fn test_merge_mapping_replaces_scalar() {
        let mut target = map(json!({"a": 1}));
        merge_maps(&mut target, map(json!({"a": {"x": 1}})));
        assert_eq!(Value::Object(target), json!({"a": {"x": 1}}));
    }

    #[test]
    fn test_merge_scalar_replaces_mapping() {
        let mut target = map(json!({"a": {"x": 1}}));
        merge_maps(&mut target, map(json!({"a": "flat"})));
        assert_eq!(Value::Object(target), json!({"a": "flat"}));
    }

    #[test]
    fn test_merge_replaces_sequences() {
        let mut target = map(json!({"list": [1, 2]}));
        merge_maps(&mut target, map(json!({"list": [3]})));
        assert_eq!(Value::Object(target), json!({"list": [3]}));
    }

    #[test]
    fn test_expand_dotted_keys() {
        let expanded = expand_dotted_keys(map(json!({
            "foo.bar.baz": "new_value",
            "foo.bar.qux": 1,
            "plain": true
        })));
        assert_eq!(
            Value::Object(expanded),
            json!({"foo": {"bar": {"baz": "new_value", "qux": 1}}, "plain": true})
        );
    }

    #[test]
    fn test_expand_leaves_nested_keys_alone() {
        let expanded = expand_dotted_keys(map(json!({"style": {"a.nav": {"color": "red"}}})));
        assert_eq!(
            Value::Object(expanded),
            json!({"style": {"a.nav": {"color": "red"}}})
        );
    }
}
