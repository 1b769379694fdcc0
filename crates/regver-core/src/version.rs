//! Creation of a new version from a chain head.

use crate::{
  Error, Result, Step,
  item::ItemSubtype,
  registry::{Registry, VersionRequest},
};

/// Ask the registry to mint a new version of `head_id` and return its id.
///
/// A refusal, or a success without an id, is
/// [`Error::VersioningRejected`] carrying the registry's detail verbatim.
pub async fn create_version<R: Registry>(
  registry: &R,
  head_id: &str,
  subtype: ItemSubtype,
  reason: &str,
) -> Result<String> {
  let request = VersionRequest {
    id:     head_id.to_string(),
    reason: reason.to_string(),
  };

  let response = registry
    .create_version(&request, subtype)
    .await
    .map_err(|e| Error::registry(Step::CreateVersion, head_id, e))?;

  if !response.status.success {
    return Err(Error::VersioningRejected {
      id:      head_id.to_string(),
      details: response.status.details,
    });
  }

  let new_id = response.new_version_id.ok_or_else(|| Error::VersioningRejected {
    id:      head_id.to_string(),
    details: "registry reported success without a new version id".to_string(),
  })?;

  tracing::info!(source = %head_id, new_id = %new_id, "created new version");
  Ok(new_id)
}
