//! Domain-info schemas for the subtypes this workflow can update.
//!
//! [`DomainSchema`] is a closed dispatch table: one variant per updatable
//! subtype, each coercing a merged document into that subtype's typed
//! domain info. Every other subtype is rejected at [`DomainSchema::try_from`].
//!
//! Coercion follows registry semantics: keys outside the schema (such as the
//! item envelope) are dropped, missing required fields and wrongly-typed
//! values are errors.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::item::ItemSubtype;

/// Free-form string annotations every domain info may carry.
pub type UserMetadata = BTreeMap<String, String>;

// ─── Dispatch ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DomainSchema {
  DatasetTemplate,
  Model,
  ModelRunWorkflowTemplate,
  Organisation,
  Person,
  Study,
}

/// Returned for subtypes without a [`DomainSchema`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("subtype {0} has no updatable domain schema")]
pub struct UnsupportedSubtype(pub ItemSubtype);

impl TryFrom<ItemSubtype> for DomainSchema {
  type Error = UnsupportedSubtype;

  fn try_from(subtype: ItemSubtype) -> Result<Self, Self::Error> {
    Ok(match subtype {
      ItemSubtype::DatasetTemplate => Self::DatasetTemplate,
      ItemSubtype::Model => Self::Model,
      ItemSubtype::ModelRunWorkflowTemplate => Self::ModelRunWorkflowTemplate,
      ItemSubtype::Organisation => Self::Organisation,
      ItemSubtype::Person => Self::Person,
      ItemSubtype::Study => Self::Study,
      ItemSubtype::Create
      | ItemSubtype::Version
      | ItemSubtype::ModelRun
      | ItemSubtype::Dataset => return Err(UnsupportedSubtype(subtype)),
    })
  }
}

impl DomainSchema {
  pub fn subtype(self) -> ItemSubtype {
    match self {
      Self::DatasetTemplate => ItemSubtype::DatasetTemplate,
      Self::Model => ItemSubtype::Model,
      Self::ModelRunWorkflowTemplate => ItemSubtype::ModelRunWorkflowTemplate,
      Self::Organisation => ItemSubtype::Organisation,
      Self::Person => ItemSubtype::Person,
      Self::Study => ItemSubtype::Study,
    }
  }

  /// Coerce `document` into this schema's domain info.
  pub fn coerce(self, document: Value) -> Result<DomainInfo, serde_json::Error> {
    fn parse<T: DeserializeOwned>(
      document: Value,
      wrap: fn(T) -> DomainInfo,
    ) -> Result<DomainInfo, serde_json::Error> {
      serde_json::from_value(document).map(wrap)
    }

    match self {
      Self::DatasetTemplate => parse(document, DomainInfo::DatasetTemplate),
      Self::Model => parse(document, DomainInfo::Model),
      Self::ModelRunWorkflowTemplate => parse(document, DomainInfo::ModelRunWorkflowTemplate),
      Self::Organisation => parse(document, DomainInfo::Organisation),
      Self::Person => parse(document, DomainInfo::Person),
      Self::Study => parse(document, DomainInfo::Study),
    }
  }
}

/// A validated domain-info document, serialised without a tag.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DomainInfo {
  DatasetTemplate(DatasetTemplateDomainInfo),
  Model(ModelDomainInfo),
  ModelRunWorkflowTemplate(ModelRunWorkflowTemplateDomainInfo),
  Organisation(OrganisationDomainInfo),
  Person(PersonDomainInfo),
  Study(StudyDomainInfo),
}

impl DomainInfo {
  pub fn to_value(&self) -> serde_json::Result<Value> { serde_json::to_value(self) }
}

// ─── Agents ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrganisationDomainInfo {
  pub name:          String,
  /// Research Organization Registry identifier.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub ror:           Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub display_name:  Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub user_metadata: Option<UserMetadata>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonDomainInfo {
  pub email:           String,
  pub first_name:      String,
  pub last_name:       String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub orcid:           Option<String>,
  pub ethics_approved: bool,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub display_name:    Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub user_metadata:   Option<UserMetadata>,
}

// ─── Entities ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDomainInfo {
  pub name:              String,
  pub description:       String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub documentation_url: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub source_url:        Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub display_name:      Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub user_metadata:     Option<UserMetadata>,
}

/// How a dataset resource is used by a model run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResourceUsageType {
  ParameterFile,
  ConfigFile,
  ForcingData,
  GeneralData,
}

/// A resource at a fixed path inside a dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefinedResource {
  pub path:                String,
  pub description:         String,
  pub usage_type:          ResourceUsageType,
  #[serde(default)]
  pub optional:            bool,
  #[serde(default)]
  pub is_folder:           bool,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub additional_metadata: Option<UserMetadata>,
}

/// A resource whose path is supplied when the template is used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeferredResource {
  pub key:                 String,
  pub description:         String,
  pub usage_type:          ResourceUsageType,
  #[serde(default)]
  pub optional:            bool,
  #[serde(default)]
  pub is_folder:           bool,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub additional_metadata: Option<UserMetadata>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetTemplateDomainInfo {
  pub display_name:       String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub description:        Option<String>,
  #[serde(default)]
  pub defined_resources:  Vec<DefinedResource>,
  #[serde(default)]
  pub deferred_resources: Vec<DeferredResource>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub user_metadata:      Option<UserMetadata>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateResource {
  pub template_id: String,
  #[serde(default)]
  pub optional:    bool,
}

/// Annotation keys a model run must (or may) supply.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkflowAnnotations {
  #[serde(default)]
  pub required: Vec<String>,
  #[serde(default)]
  pub optional: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelRunWorkflowTemplateDomainInfo {
  pub display_name:     String,
  pub software_id:      String,
  #[serde(default)]
  pub input_templates:  Vec<TemplateResource>,
  #[serde(default)]
  pub output_templates: Vec<TemplateResource>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub annotations:      Option<WorkflowAnnotations>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub user_metadata:    Option<UserMetadata>,
}

// ─── Activities ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyDomainInfo {
  pub title:                String,
  pub description:          String,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub study_alternative_id: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub display_name:         Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub user_metadata:        Option<UserMetadata>,
}

#[cfg(test)]
mod tests {
  use serde_json::json;
  use strum::VariantArray as _;

  use super::*;

  #[test]
  fn exactly_six_subtypes_are_updatable() {
    let supported: Vec<_> = ItemSubtype::VARIANTS
      .iter()
      .filter_map(|s| DomainSchema::try_from(*s).ok())
      .collect();
    assert_eq!(supported.len(), 6);
    for schema in supported {
      assert_eq!(DomainSchema::try_from(schema.subtype()), Ok(schema));
    }
  }

  #[test]
  fn unsupported_subtypes_are_rejected() {
    for subtype in [
      ItemSubtype::Dataset,
      ItemSubtype::ModelRun,
      ItemSubtype::Create,
      ItemSubtype::Version,
    ] {
      assert_eq!(DomainSchema::try_from(subtype), Err(UnsupportedSubtype(subtype)));
    }
  }

  #[test]
  fn coercion_drops_envelope_fields() {
    let info = DomainSchema::Model
      .coerce(json!({
        "id": "item-1",
        "item_subtype": "MODEL",
        "versioning_info": { "version": 2 },
        "name": "M",
        "description": "v2",
      }))
      .unwrap();

    assert_eq!(info.to_value().unwrap(), json!({ "name": "M", "description": "v2" }));
  }

  #[test]
  fn missing_required_field_is_rejected() {
    let err = DomainSchema::Person
      .coerce(json!({ "email": "a@b.c", "first_name": "A", "ethics_approved": true }))
      .unwrap_err();
    assert!(err.to_string().contains("last_name"));
  }

  #[test]
  fn wrong_value_type_is_rejected() {
    let result = DomainSchema::Organisation
      .coerce(json!({ "name": "Org", "user_metadata": { "count": 3 } }));
    assert!(result.is_err());
  }

  #[test]
  fn nested_resources_are_validated() {
    let ok = DomainSchema::DatasetTemplate.coerce(json!({
      "display_name": "Inputs",
      "defined_resources": [
        { "path": "params.json", "description": "p", "usage_type": "PARAMETER_FILE" }
      ],
    }));
    let DomainInfo::DatasetTemplate(template) = ok.unwrap() else {
      panic!("wrong variant");
    };
    assert!(!template.defined_resources[0].optional);

    let bad = DomainSchema::DatasetTemplate.coerce(json!({
      "display_name": "Inputs",
      "defined_resources": [
        { "path": "params.json", "description": "p", "usage_type": "SOMETHING_ELSE" }
      ],
    }));
    assert!(bad.is_err());
  }

  #[test]
  fn workflow_template_keeps_annotations() {
    let info = DomainSchema::ModelRunWorkflowTemplate
      .coerce(json!({
        "display_name": "Run",
        "software_id": "model-1",
        "input_templates": [{ "template_id": "t-1" }],
        "annotations": { "required": ["site"] },
      }))
      .unwrap();

    assert_eq!(
      info.to_value().unwrap(),
      json!({
        "display_name": "Run",
        "software_id": "model-1",
        "input_templates": [{ "template_id": "t-1", "optional": false }],
        "output_templates": [],
        "annotations": { "required": ["site"], "optional": [] },
      })
    );
  }

  #[test]
  fn study_requires_title() {
    assert!(DomainSchema::Study.coerce(json!({ "description": "d" })).is_err());
    assert!(
      DomainSchema::Study
        .coerce(json!({ "title": "T", "description": "d" }))
        .is_ok()
    );
  }
}
