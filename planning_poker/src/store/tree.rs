//! Document tree operations shared by the store implementations.
//!
//! A null value means "absent": writing null removes a node, objects left
//! without fields disappear, and empty arrays collapse to null.

use serde_json::{Map, Value};

/// Strips null object fields and collapses empty containers to null.
pub(crate) fn normalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let map: Map<String, Value> = map
                .into_iter()
                .map(|(key, child)| (key, normalize(child)))
                .filter(|(_, child)| !child.is_null())
                .collect();
            if map.is_empty() {
                Value::Null
            } else {
                Value::Object(map)
            }
        }
        Value::Array(items) if items.is_empty() => Value::Null,
        other => other,
    }
}

/// Value at `segments` below `node`, if present and non-null.
pub(crate) fn get<'a>(node: &'a Value, segments: &[String]) -> Option<&'a Value> {
    segments
        .iter()
        .try_fold(node, |current, segment| match current {
            Value::Object(map) => map.get(segment.as_str()),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        })
        .filter(|value| !value.is_null())
}

/// Overwrites the node at `segments` with `value`.
///
/// `value` must already be normalized. Writing null prunes the node and any
/// ancestor objects left empty; missing ancestors are created as objects.
pub(crate) fn set(node: &mut Value, segments: &[String], value: Value) {
    let Some((head, rest)) = segments.split_first() else {
        *node = value;
        return;
    };

    if let Value::Array(items) = node {
        if let Some(slot) = head.parse::<usize>().ok().and_then(|i| items.get_mut(i)) {
            set(slot, rest, value);
            return;
        }
    }

    if value.is_null() {
        if let Value::Object(map) = node {
            if let Some(child) = map.get_mut(head.as_str()) {
                set(child, rest, Value::Null);
                if child.is_null() {
                    map.remove(head.as_str());
                }
            }
            if map.is_empty() {
                *node = Value::Null;
            }
        }
        return;
    }

    if !node.is_object() {
        *node = Value::Object(Map::new());
    }
    if let Value::Object(map) = node {
        let child = map.entry(head.clone()).or_insert(Value::Null);
        set(child, rest, value);
    }
}
