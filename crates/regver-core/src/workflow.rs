//! The end-to-end versioning workflow.
//!
//! resolve head → check subtype is updatable → create version → (optionally)
//! merge and apply the update to the new version.

use crate::{
  Error, WorkflowError,
  chain::resolve_head,
  item::JsonObject,
  registry::Registry,
  schema::DomainSchema,
  update::apply_update,
  version::create_version,
};

/// Reason recorded for the update when the caller supplies none.
pub const DEFAULT_UPDATE_REASON: &str = "Updating metadata attributes via automated versioning.";

/// Input to [`run_workflow`].
#[derive(Debug, Clone, Default)]
pub struct WorkflowRequest {
  /// Any id in the chain; the head is located from here.
  pub item_id:         String,
  pub version_reason:  String,
  pub update_reason:   Option<String>,
  /// Partial metadata merged into the new version. `None` skips the update.
  pub update_document: Option<JsonObject>,
}

/// Run the workflow and return the id of the newly created version.
pub async fn run_workflow<R: Registry>(
  registry: &R,
  request: &WorkflowRequest,
) -> Result<String, WorkflowError> {
  let head = resolve_head(registry, &request.item_id)
    .await
    .map_err(WorkflowError::NoVersionCreated)?;

  // Checked before any mutation so a version is never created that this
  // workflow could not update.
  let schema = DomainSchema::try_from(head.subtype).map_err(|e| {
    WorkflowError::NoVersionCreated(Error::UnsupportedSubtype {
      id:      head.id.clone(),
      subtype: e.0,
    })
  })?;

  let new_id = create_version(registry, &head.id, head.subtype, &request.version_reason)
    .await
    .map_err(WorkflowError::NoVersionCreated)?;

  let Some(updates) = &request.update_document else {
    tracing::info!(%new_id, "no update document supplied; skipping update");
    return Ok(new_id);
  };

  let reason = request
    .update_reason
    .as_deref()
    .unwrap_or(DEFAULT_UPDATE_REASON);

  match apply_update(registry, &new_id, schema, reason, updates).await {
    Ok(()) => Ok(new_id),
    Err(source) => Err(WorkflowError::UpdateNotApplied { new_id, source }),
  }
}
