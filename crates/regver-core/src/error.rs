//! Error types for `regver-core`.

use thiserror::Error;

use crate::item::ItemSubtype;

/// The workflow step during which an error was raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum Step {
  ResolveHead,
  CreateVersion,
  ApplyUpdate,
}

/// A terminal failure of one workflow step. None of these are retried.
#[derive(Debug, Error)]
pub enum Error {
  #[error("{step}: item {id} not found in registry")]
  NotFound { step: Step, id: String },

  #[error("{step}: item {id} is malformed: {reason}")]
  MalformedRecord {
    step:   Step,
    id:     String,
    reason: String,
  },

  /// The version chain revisits `next`, which was already walked.
  #[error("resolve_head: version chain cycle at item {id} (next version {next} already visited)")]
  CycleDetected { id: String, next: String },

  #[error("resolve_head: item {id} has subtype {subtype}, which cannot be updated by this workflow")]
  UnsupportedSubtype { id: String, subtype: ItemSubtype },

  #[error("create_version: registry rejected new version of {id}: {details}")]
  VersioningRejected { id: String, details: String },

  #[error("apply_update: merged metadata for {id} does not match the {subtype} schema: {source}")]
  SchemaValidation {
    id:      String,
    subtype: ItemSubtype,
    #[source]
    source:  serde_json::Error,
  },

  #[error("apply_update: registry rejected update of {id}: {details}")]
  UpdateRejected { id: String, details: String },

  #[error("{step}: registry request for {id} failed: {source}")]
  Registry {
    step:   Step,
    id:     String,
    #[source]
    source: Box<dyn std::error::Error + Send + Sync>,
  },
}

impl Error {
  pub fn step(&self) -> Step {
    match self {
      Self::NotFound { step, .. }
      | Self::MalformedRecord { step, .. }
      | Self::Registry { step, .. } => *step,
      Self::CycleDetected { .. } | Self::UnsupportedSubtype { .. } => Step::ResolveHead,
      Self::VersioningRejected { .. } => Step::CreateVersion,
      Self::SchemaValidation { .. } | Self::UpdateRejected { .. } => Step::ApplyUpdate,
    }
  }

  /// The item the failing step was operating on.
  pub fn item_id(&self) -> &str {
    match self {
      Self::NotFound { id, .. }
      | Self::MalformedRecord { id, .. }
      | Self::CycleDetected { id, .. }
      | Self::UnsupportedSubtype { id, .. }
      | Self::VersioningRejected { id, .. }
      | Self::SchemaValidation { id, .. }
      | Self::UpdateRejected { id, .. }
      | Self::Registry { id, .. } => id,
    }
  }

  pub(crate) fn registry<E>(step: Step, id: &str, source: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Registry {
      step,
      id: id.to_string(),
      source: Box::new(source),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The outcome of a failed [`crate::run_workflow`] call.
///
/// Versioning and updating are separate mutations with no rollback, so a
/// failure after the new version exists is reported on its own.
#[derive(Debug, Error)]
pub enum WorkflowError {
  #[error("no new version was created: {0}")]
  NoVersionCreated(#[source] Error),

  #[error("new version {new_id} was created but its metadata update was not applied: {source}")]
  UpdateNotApplied {
    new_id: String,
    #[source]
    source: Error,
  },
}

impl WorkflowError {
  /// The id of the version that exists despite the failure, if any.
  pub fn new_id(&self) -> Option<&str> {
    match self {
      Self::NoVersionCreated(_) => None,
      Self::UpdateNotApplied { new_id, .. } => Some(new_id),
    }
  }

  pub fn cause(&self) -> &Error {
    match self {
      Self::NoVersionCreated(e) | Self::UpdateNotApplied { source: e, .. } => e,
    }
  }
}
