//! Registry items as seen by the versioning workflow.
//!
//! The registry returns items as loosely-typed JSON objects. Only the
//! envelope fields needed to walk a version chain are parsed; the rest of the
//! object is carried as opaque metadata.

use serde::{Deserialize, Serialize};

use crate::{Error, Result, Step};

/// A JSON object: string keys to arbitrary JSON values.
pub type JsonObject = serde_json::Map<String, serde_json::Value>;

// ─── Subtype ─────────────────────────────────────────────────────────────────

/// The closed set of item subtypes known to the registry.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
  strum::VariantArray,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemSubtype {
  Organisation,
  Person,
  Create,
  Version,
  ModelRun,
  Model,
  Dataset,
  DatasetTemplate,
  ModelRunWorkflowTemplate,
  Study,
}

// ─── Versioning ──────────────────────────────────────────────────────────────

/// Version-chain pointers maintained by the registry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersioningInfo {
  #[serde(default)]
  pub previous_version: Option<String>,
  #[serde(default)]
  pub version:          Option<u64>,
  #[serde(default)]
  pub reason:           Option<String>,
  /// Present iff a newer version exists.
  #[serde(default)]
  pub next_version:     Option<String>,
}

// ─── Record ──────────────────────────────────────────────────────────────────

/// A registry entry. `metadata` is the full object as fetched.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemRecord {
  pub id:              String,
  pub subtype:         ItemSubtype,
  pub versioning_info: Option<VersioningInfo>,
  pub metadata:        JsonObject,
}

#[derive(Deserialize)]
struct Envelope {
  id:              String,
  item_subtype:    String,
  #[serde(default)]
  versioning_info: Option<VersioningInfo>,
}

impl ItemRecord {
  /// Parse a fetched object. `requested_id` and `step` only label errors.
  pub fn parse(requested_id: &str, step: Step, metadata: JsonObject) -> Result<Self> {
    let malformed = |reason: String| Error::MalformedRecord {
      step,
      id: requested_id.to_string(),
      reason,
    };

    let envelope: Envelope =
      serde_json::from_value(serde_json::Value::Object(metadata.clone()))
        .map_err(|e| malformed(e.to_string()))?;

    let subtype = envelope
      .item_subtype
      .parse::<ItemSubtype>()
      .map_err(|_| malformed(format!("unrecognised item subtype {:?}", envelope.item_subtype)))?;

    Ok(Self {
      id: envelope.id,
      subtype,
      versioning_info: envelope.versioning_info,
      metadata,
    })
  }

  /// The successor of this record in its version chain, if any.
  pub fn next_version(&self) -> Option<&str> {
    self
      .versioning_info
      .as_ref()
      .and_then(|v| v.next_version.as_deref())
  }
}
