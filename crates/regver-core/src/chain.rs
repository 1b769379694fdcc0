//! Version-chain resolution.
//!
//! Items form a forward singly-linked chain through
//! `versioning_info.next_version`. The head is the record without a
//! successor. The walk keeps every id it has seen and fails on a revisit, so
//! it terminates on corrupted chains too.

use std::collections::HashSet;

use crate::{
  Error, Result, Step,
  item::{ItemRecord, ItemSubtype},
  registry::Registry,
};

/// The newest record of a version chain.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainHead {
  pub id:      String,
  pub subtype: ItemSubtype,
  /// Number of successor links followed from the start id.
  pub hops:    usize,
}

/// Fetch one item and parse its envelope.
pub(crate) async fn fetch_record<R: Registry>(
  registry: &R,
  id: &str,
  step: Step,
) -> Result<ItemRecord> {
  let raw = registry
    .read_item(id)
    .await
    .map_err(|e| Error::registry(step, id, e))?
    .ok_or_else(|| Error::NotFound { step, id: id.to_string() })?;
  ItemRecord::parse(id, step, raw)
}

/// Walk the chain from `start_id` to its head.
pub async fn resolve_head<R: Registry>(registry: &R, start_id: &str) -> Result<ChainHead> {
  let mut current = start_id.to_string();
  let mut visited = HashSet::from([current.clone()]);

  loop {
    tracing::debug!(id = %current, "fetching chain link");
    let record = fetch_record(registry, &current, Step::ResolveHead).await?;

    let Some(next) = record.next_version() else {
      let hops = visited.len() - 1;
      tracing::info!(start = %start_id, head = %current, subtype = %record.subtype, hops, "resolved chain head");
      return Ok(ChainHead {
        id: current,
        subtype: record.subtype,
        hops,
      });
    };

    if !visited.insert(next.to_string()) {
      return Err(Error::CycleDetected {
        id:   current,
        next: next.to_string(),
      });
    }
    current = next.to_string();
  }
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;
  use crate::memory::MemoryRegistry;

  fn link(id: &str, next: Option<&str>) -> serde_json::Value {
    json!({
      "id": id,
      "item_subtype": "MODEL",
      "versioning_info": { "next_version": next },
    })
  }

  #[tokio::test]
  async fn single_record_is_its_own_head() {
    let registry = MemoryRegistry::new();
    registry.insert(link("item-1", None));

    let head = resolve_head(&registry, "item-1").await.unwrap();
    assert_eq!(head.id, "item-1");
    assert_eq!(head.subtype, ItemSubtype::Model);
    assert_eq!(head.hops, 0);
  }

  #[tokio::test]
  async fn follows_chain_to_head() {
    let registry = MemoryRegistry::new();
    registry.insert(link("A", Some("B")));
    registry.insert(link("B", Some("C")));
    registry.insert(json!({ "id": "C", "item_subtype": "STUDY" }));

    let head = resolve_head(&registry, "A").await.unwrap();
    assert_eq!(head.id, "C");
    // The head's subtype wins.
    assert_eq!(head.subtype, ItemSubtype::Study);
    assert_eq!(head.hops, 2);
    assert_eq!(registry.calls().reads, vec!["A", "B", "C"]);
  }

  #[tokio::test]
  async fn starting_mid_chain_only_walks_forward() {
    let registry = MemoryRegistry::new();
    registry.insert(link("A", Some("B")));
    registry.insert(link("B", Some("C")));
    registry.insert(link("C", None));

    let head = resolve_head(&registry, "B").await.unwrap();
    assert_eq!(head.id, "C");
    assert_eq!(registry.calls().reads, vec!["B", "C"]);
  }

  #[tokio::test]
  async fn long_chains_resolve() {
    let registry = MemoryRegistry::new();
    let ids: Vec<String> = (0..500).map(|i| format!("v{i}")).collect();
    for pair in ids.windows(2) {
      registry.insert(link(&pair[0], Some(&pair[1])));
    }
    registry.insert(link("v499", None));

    let head = resolve_head(&registry, "v0").await.unwrap();
    assert_eq!(head.id, "v499");
    assert_eq!(head.hops, 499);
  }

  #[tokio::test]
  async fn self_reference_is_a_cycle() {
    let registry = MemoryRegistry::new();
    registry.insert(link("A", Some("A")));

    let err = resolve_head(&registry, "A").await.unwrap_err();
    assert!(matches!(err, Error::CycleDetected { ref id, ref next } if id == "A" && next == "A"));
  }

  #[tokio::test]
  async fn longer_cycle_is_detected() {
    let registry = MemoryRegistry::new();
    registry.insert(link("A", Some("B")));
    registry.insert(link("B", Some("C")));
    registry.insert(link("C", Some("B")));

    let err = resolve_head(&registry, "A").await.unwrap_err();
    assert!(matches!(err, Error::CycleDetected { ref id, ref next } if id == "C" && next == "B"));
    assert_eq!(err.step(), Step::ResolveHead);
  }

  #[tokio::test]
  async fn missing_link_is_not_found() {
    let registry = MemoryRegistry::new();
    registry.insert(link("A", Some("B")));

    let err = resolve_head(&registry, "A").await.unwrap_err();
    assert!(matches!(err, Error::NotFound { step: Step::ResolveHead, ref id } if id == "B"));
  }

  #[tokio::test]
  async fn malformed_link_is_reported() {
    let registry = MemoryRegistry::new();
    registry.insert(link("A", Some("B")));
    registry.insert(json!({ "id": "B", "item_subtype": 42 }));

    let err = resolve_head(&registry, "A").await.unwrap_err();
    assert!(matches!(err, Error::MalformedRecord { ref id, .. } if id == "B"));
  }

  #[tokio::test]
  async fn transport_failure_carries_step_and_id() {
    let registry = MemoryRegistry::new();
    registry.insert(link("A", None));
    registry.set_offline(true);

    let err = resolve_head(&registry, "A").await.unwrap_err();
    assert!(matches!(err, Error::Registry { step: Step::ResolveHead, .. }));
    assert_eq!(err.item_id(), "A");
  }
}
