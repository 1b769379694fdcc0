//! [`MemoryRegistry`] — an in-process [`Registry`] for tests.
//!
//! Mirrors the registry's versioning rules closely enough to drive the whole
//! workflow, records every call, and can be told to refuse or go offline.

use std::{
  collections::{HashMap, VecDeque},
  sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use serde_json::Value;

use crate::{
  item::{ItemSubtype, JsonObject, VersioningInfo},
  registry::{Registry, Status, UpdateRequest, VersionRequest, VersionResponse},
};

/// Envelope keys kept when an update replaces an item's domain info.
const ENVELOPE_KEYS: &[&str] = &["id", "item_category", "item_subtype", "versioning_info"];

#[derive(Debug, thiserror::Error)]
pub enum MemoryError {
  #[error("registry is offline")]
  Offline,
}

/// Every call made against a [`MemoryRegistry`], in order.
#[derive(Debug, Clone, Default)]
pub struct CallLog {
  pub reads:    Vec<String>,
  pub versions: Vec<(VersionRequest, ItemSubtype)>,
  pub updates:  Vec<UpdateRequest>,
}

#[derive(Default)]
struct State {
  items:             HashMap<String, JsonObject>,
  calls:             CallLog,
  queued_ids:        VecDeque<String>,
  version_rejection: Option<String>,
  update_rejection:  Option<String>,
  offline:           bool,
}

/// Cloning is cheap; clones share the same items and call log.
#[derive(Clone, Default)]
pub struct MemoryRegistry {
  state: Arc<Mutex<State>>,
}

impl MemoryRegistry {
  pub fn new() -> Self { Self::default() }

  fn state(&self) -> MutexGuard<'_, State> {
    self.state.lock().unwrap_or_else(PoisonError::into_inner)
  }

  /// Store `item`, keyed by its `id` field.
  ///
  /// # Panics
  ///
  /// If `item` is not an object with a string `id`.
  pub fn insert(&self, item: Value) {
    let Value::Object(item) = item else {
      panic!("registry items must be JSON objects");
    };
    let Some(id) = item.get("id").and_then(Value::as_str).map(str::to_owned) else {
      panic!("registry items need a string id");
    };
    self.state().items.insert(id, item);
  }

  pub fn get(&self, id: &str) -> Option<JsonObject> { self.state().items.get(id).cloned() }

  pub fn calls(&self) -> CallLog { self.state().calls.clone() }

  /// Use `id` for the next created version instead of a random UUID.
  pub fn queue_version_id(&self, id: impl Into<String>) {
    self.state().queued_ids.push_back(id.into());
  }

  /// Refuse every version request with `details`.
  pub fn reject_versions(&self, details: impl Into<String>) {
    self.state().version_rejection = Some(details.into());
  }

  /// Refuse every update request with `details`.
  pub fn reject_updates(&self, details: impl Into<String>) {
    self.state().update_rejection = Some(details.into());
  }

  /// Fail every call with a transport error while set.
  pub fn set_offline(&self, offline: bool) { self.state().offline = offline; }
}

fn versioning_info(item: &JsonObject) -> VersioningInfo {
  item
    .get("versioning_info")
    .cloned()
    .and_then(|v| serde_json::from_value(v).ok())
    .unwrap_or_default()
}

fn set_versioning_info(item: &mut JsonObject, info: &VersioningInfo) {
  item.insert(
    "versioning_info".to_string(),
    serde_json::json!({
      "previous_version": info.previous_version,
      "version": info.version,
      "reason": info.reason,
      "next_version": info.next_version,
    }),
  );
}

impl Registry for MemoryRegistry {
  type Error = MemoryError;

  async fn read_item(&self, id: &str) -> Result<Option<JsonObject>, MemoryError> {
    let mut state = self.state();
    if state.offline {
      return Err(MemoryError::Offline);
    }
    state.calls.reads.push(id.to_string());
    Ok(state.items.get(id).cloned())
  }

  async fn create_version(
    &self,
    request: &VersionRequest,
    subtype: ItemSubtype,
  ) -> Result<VersionResponse, MemoryError> {
    let mut guard = self.state();
    let state = &mut *guard;
    if state.offline {
      return Err(MemoryError::Offline);
    }
    state.calls.versions.push((request.clone(), subtype));

    let refuse = |details: String| -> Result<VersionResponse, MemoryError> {
      Ok(VersionResponse {
        status:         Status::failed(details),
        new_version_id: None,
      })
    };

    if let Some(details) = &state.version_rejection {
      return refuse(details.clone());
    }
    let Some(source) = state.items.get(&request.id) else {
      return refuse(format!("item {} does not exist", request.id));
    };
    let source_info = versioning_info(source);
    if let Some(next) = &source_info.next_version {
      return refuse(format!("item {} is not the latest version (next is {next})", request.id));
    }

    let new_id = state
      .queued_ids
      .pop_front()
      .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    let mut new_item = source.clone();
    new_item.insert("id".to_string(), Value::String(new_id.clone()));
    set_versioning_info(&mut new_item, &VersioningInfo {
      previous_version: Some(request.id.clone()),
      version:          Some(source_info.version.unwrap_or(1) + 1),
      reason:           Some(request.reason.clone()),
      next_version:     None,
    });

    if let Some(source) = state.items.get_mut(&request.id) {
      set_versioning_info(source, &VersioningInfo {
        next_version: Some(new_id.clone()),
        ..source_info
      });
    }
    state.items.insert(new_id.clone(), new_item);

    Ok(VersionResponse {
      status:         Status::ok(),
      new_version_id: Some(new_id),
    })
  }

  async fn update_item(&self, request: &UpdateRequest) -> Result<Status, MemoryError> {
    let mut guard = self.state();
    let state = &mut *guard;
    if state.offline {
      return Err(MemoryError::Offline);
    }
    state.calls.updates.push(request.clone());

    if let Some(details) = &state.update_rejection {
      return Ok(Status::failed(details.clone()));
    }
    let Some(item) = state.items.get_mut(&request.id) else {
      return Ok(Status::failed(format!("item {} does not exist", request.id)));
    };

    let mut replaced: JsonObject = ENVELOPE_KEYS
      .iter()
      .filter_map(|k| item.get(*k).map(|v| (k.to_string(), v.clone())))
      .collect();
    match request.domain_info.to_value() {
      Ok(Value::Object(domain)) => replaced.extend(domain),
      Ok(other) => return Ok(Status::failed(format!("domain info is not an object: {other}"))),
      Err(e) => return Ok(Status::failed(format!("domain info does not serialise: {e}"))),
    }
    *item = replaced;

    Ok(Status::ok())
  }
}
