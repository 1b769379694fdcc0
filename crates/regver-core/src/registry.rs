//! The `Registry` trait and its request/response types.
//!
//! The trait is implemented by registry backends (e.g. `regver-client`).
//! The workflow depends on this abstraction, never on a concrete transport.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::{item::{ItemSubtype, JsonObject}, schema::DomainInfo};

// ─── Request/response types ──────────────────────────────────────────────────

/// Success flag and remote detail attached to every mutating response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Status {
  pub success: bool,
  #[serde(default)]
  pub details: String,
}

impl Status {
  pub fn ok() -> Self {
    Self { success: true, details: String::new() }
  }

  pub fn failed(details: impl Into<String>) -> Self {
    Self { success: false, details: details.into() }
  }
}

/// A request to mint a new version from `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionRequest {
  pub id:     String,
  /// Free-text audit reason recorded by the registry.
  pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionResponse {
  pub status:         Status,
  #[serde(default)]
  pub new_version_id: Option<String>,
}

/// A request to overwrite the domain metadata of `id`.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateRequest {
  pub id:          String,
  pub subtype:     ItemSubtype,
  pub reason:      String,
  pub domain_info: DomainInfo,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// The registry capabilities the workflow consumes.
///
/// Remote refusals are reported in-band (`None`, `Status::success == false`).
/// `Self::Error` is reserved for transport and protocol failures.
pub trait Registry: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Fetch an item by id. Returns `None` if the registry has no such item.
  fn read_item<'a>(
    &'a self,
    id: &'a str,
  ) -> impl Future<Output = Result<Option<JsonObject>, Self::Error>> + Send + 'a;

  /// Ask the registry to create a new version of `request.id`.
  ///
  /// The subtype selects the registry's versioning rules for the item.
  fn create_version<'a>(
    &'a self,
    request: &'a VersionRequest,
    subtype: ItemSubtype,
  ) -> impl Future<Output = Result<VersionResponse, Self::Error>> + Send + 'a;

  /// Replace the domain metadata of `request.id` with `request.domain_info`.
  fn update_item<'a>(
    &'a self,
    request: &'a UpdateRequest,
  ) -> impl Future<Output = Result<Status, Self::Error>> + Send + 'a;
}
