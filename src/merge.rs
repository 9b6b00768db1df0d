//! Deep merge of attribute trees.
//!
//! The rule:
//! * objects merge key by key, recursively;
//! * arrays in the source replace the target array wholesale;
//! * every other value (strings, numbers, booleans, null) overwrites.
//!
//! A source that is not an object merges nothing into a field map.

use serde_json::{Map, Value};

/// Merges `source` on top of the `target` field map.
pub fn merge_into(target: &mut Map<String, Value>, source: &Value) {
    if let Value::Object(source) = source {
        merge_maps(target, source);
    }
}

/// Merges every key of `source` into `target`.
pub fn merge_maps(target: &mut Map<String, Value>, source: &Map<String, Value>) {
    for (key, incoming) in source {
        match target.get_mut(key) {
            Some(existing) => merge_value(existing, incoming),
            None => {
                target.insert(key.clone(), incoming.clone());
            }
        }
    }
}

fn merge_value(existing: &mut Value, incoming: &Value) {
    match (existing, incoming) {
        (Value::Object(existing), Value::Object(incoming)) => merge_maps(existing, incoming),
        (existing, incoming) => *existing = incoming.clone(),
    }
}
