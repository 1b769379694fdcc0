//! [`RegistryClient`] — the HTTP implementation of [`Registry`].
//!
//! | Capability | Request |
//! |------------|---------|
//! | `read_item` | `GET /registry/general/fetch?id=<id>` |
//! | `create_version` | `POST /registry/<route>/version`, body `{"id","reason"}` |
//! | `update_item` | `PUT /registry/<route>/update?id=<id>&reason=<reason>`, body domain info |

use std::time::Duration;

use regver_core::{
  item::{ItemSubtype, JsonObject},
  registry::{Registry, Status, UpdateRequest, VersionRequest, VersionResponse},
};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;

use crate::{
  auth::OfflineTokenAuth,
  error::{ClientError, Result},
};

/// Connection settings for a registry deployment.
#[derive(Debug, Clone)]
pub struct ClientConfig {
  pub registry_url:  String,
  pub token_url:     String,
  pub client_id:     String,
  pub offline_token: String,
  pub timeout:       Duration,
}

impl ClientConfig {
  pub const DEFAULT_CLIENT_ID: &'static str = "automated-access";

  /// Settings for the conventional URL layout of a deployment at `domain`.
  pub fn for_domain(domain: &str, realm: &str, offline_token: impl Into<String>) -> Self {
    Self {
      registry_url:  format!("https://registry-api.{domain}"),
      token_url:     format!(
        "https://auth.{domain}/auth/realms/{realm}/protocol/openid-connect/token"
      ),
      client_id:     Self::DEFAULT_CLIENT_ID.to_string(),
      offline_token: offline_token.into(),
      timeout:       Duration::from_secs(30),
    }
  }
}

/// The registry API path segment that serves items of `subtype`.
pub fn route(subtype: ItemSubtype) -> &'static str {
  match subtype {
    ItemSubtype::Organisation => "agent/organisation",
    ItemSubtype::Person => "agent/person",
    ItemSubtype::Create => "activity/create",
    ItemSubtype::Version => "activity/version",
    ItemSubtype::ModelRun => "activity/model_run",
    ItemSubtype::Study => "activity/study",
    ItemSubtype::Model => "entity/model",
    ItemSubtype::Dataset => "entity/dataset",
    ItemSubtype::DatasetTemplate => "entity/dataset_template",
    ItemSubtype::ModelRunWorkflowTemplate => "entity/model_run_workflow",
  }
}

#[derive(Deserialize)]
struct FetchResponse {
  #[serde(default)]
  status: Option<Status>,
  #[serde(default)]
  item:   Option<JsonObject>,
}

#[derive(Deserialize)]
struct StatusResponse {
  status: Status,
}

/// Async HTTP client for the registry API.
pub struct RegistryClient {
  client: Client,
  config: ClientConfig,
  auth:   OfflineTokenAuth,
}

impl RegistryClient {
  pub fn new(config: ClientConfig) -> Result<Self> {
    let client = Client::builder().timeout(config.timeout).build()?;
    let auth = OfflineTokenAuth::new(
      client.clone(),
      &config.token_url,
      &config.client_id,
      &config.offline_token,
    );
    Ok(Self { client, config, auth })
  }

  fn url(&self, path: &str) -> String {
    format!("{}{}", self.config.registry_url.trim_end_matches('/'), path)
  }

  async fn authed(&self, req: RequestBuilder) -> Result<RequestBuilder> {
    Ok(req.bearer_auth(self.auth.access_token().await?))
  }

  async fn unexpected(method: &'static str, path: String, resp: Response) -> ClientError {
    let status = resp.status();
    let body = resp.text().await.unwrap_or_default();
    ClientError::Status { method, path, status, body }
  }
}

/// Statuses a mutating endpoint uses to refuse a well-formed request.
fn is_refusal(status: StatusCode) -> bool {
  matches!(
    status,
    StatusCode::BAD_REQUEST | StatusCode::CONFLICT | StatusCode::UNPROCESSABLE_ENTITY
  )
}

/// The refusal detail: the `detail` field of a JSON error body, else the
/// body itself.
async fn refusal_detail(resp: Response) -> String {
  let body = resp.text().await.unwrap_or_default();
  match serde_json::from_str::<serde_json::Value>(&body) {
    Ok(serde_json::Value::Object(map)) => match map.get("detail") {
      Some(serde_json::Value::String(detail)) => detail.clone(),
      Some(detail) => detail.to_string(),
      None => body,
    },
    _ => body,
  }
}

impl Registry for RegistryClient {
  type Error = ClientError;

  async fn read_item(&self, id: &str) -> Result<Option<JsonObject>> {
    let path = "/registry/general/fetch";
    tracing::debug!(%id, "GET {path}");
    let resp = self
      .authed(self.client.get(self.url(path)).query(&[("id", id)]))
      .await?
      .send()
      .await?;

    match resp.status() {
      StatusCode::NOT_FOUND => return Ok(None),
      s if !s.is_success() => return Err(Self::unexpected("GET", path.to_string(), resp).await),
      _ => {}
    }

    let body: FetchResponse = resp.json().await?;
    if body.item.is_none()
      && let Some(status) = &body.status
    {
      tracing::debug!(%id, details = %status.details, "registry returned no item");
    }
    Ok(body.item)
  }

  async fn create_version(
    &self,
    request: &VersionRequest,
    subtype: ItemSubtype,
  ) -> Result<VersionResponse> {
    let path = format!("/registry/{}/version", route(subtype));
    tracing::debug!(id = %request.id, "POST {path}");
    let resp = self
      .authed(self.client.post(self.url(&path)).json(request))
      .await?
      .send()
      .await?;

    let status = resp.status();
    if is_refusal(status) {
      return Ok(VersionResponse {
        status:         Status::failed(refusal_detail(resp).await),
        new_version_id: None,
      });
    }
    if !status.is_success() {
      return Err(Self::unexpected("POST", path, resp).await);
    }
    Ok(resp.json().await?)
  }

  async fn update_item(&self, request: &UpdateRequest) -> Result<Status> {
    let path = format!("/registry/{}/update", route(request.subtype));
    tracing::debug!(id = %request.id, "PUT {path}");
    let resp = self
      .authed(
        self
          .client
          .put(self.url(&path))
          .query(&[("id", request.id.as_str()), ("reason", request.reason.as_str())])
          .json(&request.domain_info),
      )
      .await?
      .send()
      .await?;

    let status = resp.status();
    if is_refusal(status) {
      return Ok(Status::failed(refusal_detail(resp).await));
    }
    if !status.is_success() {
      return Err(Self::unexpected("PUT", path, resp).await);
    }
    let body: StatusResponse = resp.json().await?;
    Ok(body.status)
  }
}

#[cfg(test)]
mod tests {
  use strum::VariantArray as _;

  use super::*;

  #[test]
  fn domain_config_layout() {
    let config = ClientConfig::for_domain("example.org", "research", "tok");
    assert_eq!(config.registry_url, "https://registry-api.example.org");
    assert_eq!(
      config.token_url,
      "https://auth.example.org/auth/realms/research/protocol/openid-connect/token"
    );
    assert_eq!(config.client_id, "automated-access");
  }

  #[test]
  fn routes_are_distinct() {
    let mut routes: Vec<_> = ItemSubtype::VARIANTS.iter().map(|s| route(*s)).collect();
    routes.sort_unstable();
    routes.dedup();
    assert_eq!(routes.len(), ItemSubtype::VARIANTS.len());
  }

  #[test]
  fn url_joins_without_double_slash() {
    let mut config = ClientConfig::for_domain("example.org", "r", "t");
    config.registry_url = "http://localhost:8000/".into();
    let client = RegistryClient::new(config).unwrap();
    assert_eq!(
      client.url("/registry/general/fetch"),
      "http://localhost:8000/registry/general/fetch"
    );
  }
}
