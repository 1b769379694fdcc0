//! Recursive structural merge of metadata documents.
//!
//! Objects merge key by key. Anything else, arrays included, is replaced
//! wholesale by the update. An explicit `null` in the update clears a field;
//! a key omitted from the update is kept.

use serde_json::Value;

use crate::item::JsonObject;

/// Merge `updates` over `existing`.
pub fn merge(existing: Value, updates: Value) -> Value {
  match (existing, updates) {
    (Value::Object(base), Value::Object(patch)) => Value::Object(merge_objects(base, patch)),
    // Arrays have no stable merge key.
    (Value::Array(_), updates @ Value::Array(_)) => updates,
    (_, updates) => updates,
  }
}

/// [`merge`] specialised to two objects.
pub fn merge_objects(mut existing: JsonObject, updates: JsonObject) -> JsonObject {
  for (key, value) in updates {
    let merged = match existing.remove(&key) {
      Some(current) => merge(current, value),
      None => value,
    };
    existing.insert(key, merged);
  }
  existing
}
