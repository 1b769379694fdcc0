//! Merge-and-update of a version's domain metadata.

use serde_json::Value;

use crate::{
  Error, Result, Step,
  chain::fetch_record,
  item::JsonObject,
  merge::merge,
  registry::{Registry, UpdateRequest},
  schema::DomainSchema,
};

/// Merge `updates` over the current metadata of `id`, validate it against
/// `schema`, and overwrite the item's domain info with the result.
///
/// The item is re-fetched first so the merge never works from a stale copy.
/// The registry write is a full replacement, not a patch.
pub async fn apply_update<R: Registry>(
  registry: &R,
  id: &str,
  schema: DomainSchema,
  reason: &str,
  updates: &JsonObject,
) -> Result<()> {
  let record = fetch_record(registry, id, Step::ApplyUpdate).await?;

  let subtype = schema.subtype();
  if record.subtype != subtype {
    return Err(Error::MalformedRecord {
      step:   Step::ApplyUpdate,
      id:     id.to_string(),
      reason: format!("subtype changed from {subtype} to {} between versions", record.subtype),
    });
  }

  let merged = merge(Value::Object(record.metadata), Value::Object(updates.clone()));
  tracing::debug!(%id, merged = %merged, "merged metadata");

  let domain_info = schema.coerce(merged).map_err(|source| Error::SchemaValidation {
    id: id.to_string(),
    subtype,
    source,
  })?;

  let request = UpdateRequest {
    id: id.to_string(),
    subtype,
    reason: reason.to_string(),
    domain_info,
  };
  let status = registry
    .update_item(&request)
    .await
    .map_err(|e| Error::registry(Step::ApplyUpdate, id, e))?;

  if !status.success {
    return Err(Error::UpdateRejected {
      id:      id.to_string(),
      details: status.details,
    });
  }

  tracing::info!(%id, %subtype, "applied metadata update");
  Ok(())
}
