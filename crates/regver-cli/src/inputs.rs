//! Action inputs.
//!
//! Read from an optional config file overlaid with `INPUT_*` environment
//! variables, the convention automation runners use to pass inputs.

use std::{collections::HashMap, path::Path, time::Duration};

use anyhow::{Context, Result, bail};
use regver_client::ClientConfig;
use regver_core::{WorkflowRequest, item::JsonObject};
use serde::Deserialize;

/// Numeric level (10 debug … 50 critical) used when none is given.
pub const DEFAULT_LOG_LEVEL: i64 = 30;

fn default_log_level() -> i64 { DEFAULT_LOG_LEVEL }

#[derive(Debug, Clone, Deserialize)]
pub struct ActionInputs {
  pub offline_token:     String,
  pub domain:            String,
  pub realm_name:        String,
  pub item_id:           String,
  pub version_reason:    String,
  #[serde(default)]
  pub update_reason:     Option<String>,
  /// JSON object merged into the new version's metadata.
  #[serde(default)]
  pub attribute_updates: Option<String>,
  #[serde(default = "default_log_level")]
  pub log_level:         i64,

  // Overrides for deployments that do not follow the default URL layout.
  #[serde(default)]
  pub registry_url:      Option<String>,
  #[serde(default)]
  pub token_url:         Option<String>,
  #[serde(default)]
  pub client_id:         Option<String>,
}

/// Runners pass unset optional inputs as empty strings.
fn non_empty(value: Option<String>) -> Option<String> {
  value.filter(|v| !v.trim().is_empty())
}

impl ActionInputs {
  /// Load inputs from `file` (if it exists) and the environment.
  ///
  /// `env` replaces the process environment when given.
  pub fn load(file: &Path, env: Option<HashMap<String, String>>) -> Result<Self> {
    let settings = config::Config::builder()
      .add_source(config::File::from(file).required(false))
      .add_source(config::Environment::with_prefix("INPUT").source(env))
      .build()
      .context("failed to read action inputs")?;

    let inputs: Self = settings
      .try_deserialize()
      .context("failed to deserialise action inputs")?;
    Ok(inputs.normalise())
  }

  fn normalise(self) -> Self {
    Self {
      update_reason: non_empty(self.update_reason),
      attribute_updates: non_empty(self.attribute_updates),
      registry_url: non_empty(self.registry_url),
      token_url: non_empty(self.token_url),
      client_id: non_empty(self.client_id),
      ..self
    }
  }

  /// Parse `attribute_updates`. Anything but a JSON object is rejected.
  pub fn update_document(&self) -> Result<Option<JsonObject>> {
    let Some(raw) = &self.attribute_updates else {
      return Ok(None);
    };
    let value: serde_json::Value =
      serde_json::from_str(raw).context("attribute_updates is not valid JSON")?;
    match value {
      serde_json::Value::Object(map) => Ok(Some(map)),
      other => bail!("attribute_updates must be a JSON object, got {other}"),
    }
  }

  pub fn workflow_request(&self) -> Result<WorkflowRequest> {
    Ok(WorkflowRequest {
      item_id:         self.item_id.clone(),
      version_reason:  self.version_reason.clone(),
      update_reason:   self.update_reason.clone(),
      update_document: self.update_document()?,
    })
  }

  pub fn client_config(&self) -> ClientConfig {
    let defaults = ClientConfig::for_domain(&self.domain, &self.realm_name, &self.offline_token);
    ClientConfig {
      registry_url: self.registry_url.clone().unwrap_or(defaults.registry_url),
      token_url: self.token_url.clone().unwrap_or(defaults.token_url),
      client_id: self.client_id.clone().unwrap_or(defaults.client_id),
      timeout: Duration::from_secs(60),
      ..defaults
    }
  }
}
