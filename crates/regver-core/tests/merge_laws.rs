//! Property tests for the metadata merge.

use proptest::prelude::*;
use regver_core::merge::merge;
use serde_json::{Map, Value, json};

fn scalar() -> impl Strategy<Value = Value> {
  prop_oneof![
    Just(Value::Null),
    any::<bool>().prop_map(Value::Bool),
    any::<i64>().prop_map(|n| json!(n)),
    "[a-z]{0,6}".prop_map(Value::String),
  ]
}

fn tree() -> impl Strategy<Value = Value> {
  scalar().prop_recursive(4, 48, 5, |inner| {
    prop_oneof![
      prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
      prop::collection::btree_map("[a-e]", inner, 0..5)
        .prop_map(|m| Value::Object(m.into_iter().collect())),
    ]
  })
}

fn object() -> impl Strategy<Value = Value> {
  prop::collection::btree_map("[a-e]", tree(), 0..5)
    .prop_map(|m| Value::Object(m.into_iter().collect()))
}

/// True if every key path of `existing` is still present in `merged`,
/// unless `updates` replaced an ancestor with a non-object.
fn keeps_existing_keys(existing: &Value, updates: &Value, merged: &Value) -> bool {
  let (Value::Object(e), Value::Object(m)) = (existing, merged) else {
    return true;
  };
  let empty = Map::new();
  let u = updates.as_object().unwrap_or(&empty);
  e.iter().all(|(key, value)| match (m.get(key), u.get(key)) {
    (None, _) => false,
    (Some(merged), Some(update)) if update.is_object() => {
      keeps_existing_keys(value, update, merged)
    }
    (Some(_), Some(_)) => true,
    (Some(merged), None) => merged == value,
  })
}

proptest! {
  #[test]
  fn empty_update_is_identity(x in object()) {
    prop_assert_eq!(merge(x.clone(), json!({})), x);
  }

  #[test]
  fn disjoint_objects_union(
    x in prop::collection::btree_map("[a-c]", tree(), 0..4),
    y in prop::collection::btree_map("[x-z]", tree(), 0..4),
  ) {
    let merged = merge(
      Value::Object(x.clone().into_iter().collect()),
      Value::Object(y.clone().into_iter().collect()),
    );
    let merged = merged.as_object().unwrap();
    prop_assert_eq!(merged.len(), x.len() + y.len());
    for (k, v) in x.iter().chain(y.iter()) {
      prop_assert_eq!(merged.get(k), Some(v));
    }
  }

  #[test]
  fn shared_keys_merge_recursively(key in "[a-e]", a in tree(), b in tree()) {
    let merged = merge(json!({ &key: a.clone() }), json!({ &key: b.clone() }));
    prop_assert_eq!(&merged[&key], &merge(a, b));
  }

  #[test]
  fn non_object_update_wins(x in tree(), y in scalar()) {
    prop_assert_eq!(merge(x, y.clone()), y);
  }

  #[test]
  fn arrays_replace_wholesale(
    a in prop::collection::vec(tree(), 0..4),
    b in prop::collection::vec(tree(), 0..4),
  ) {
    let merged = merge(json!({ "k": a }), json!({ "k": b.clone() }));
    prop_assert_eq!(merged, json!({ "k": b }));
  }

  #[test]
  fn remerging_is_idempotent(x in object(), y in object()) {
    let once = merge(x, y.clone());
    prop_assert_eq!(merge(once.clone(), y), once);
  }

  #[test]
  fn existing_keys_survive(x in object(), y in object()) {
    let merged = merge(x.clone(), y.clone());
    prop_assert!(keeps_existing_keys(&x, &y, &merged));
  }
}
