//! Offline-token authentication.
//!
//! The long-lived offline token is exchanged for short-lived access tokens
//! with the OAuth2 `refresh_token` grant. Access tokens are cached until
//! shortly before they expire.

use std::time::{Duration, Instant};

use reqwest::Client;
use serde::Deserialize;
use tokio::sync::Mutex;

use crate::error::{ClientError, Result};

/// Refresh this long before the server-reported expiry.
const EXPIRY_MARGIN: Duration = Duration::from_secs(30);

#[derive(Deserialize)]
struct TokenResponse {
  access_token: String,
  #[serde(default)]
  expires_in:   u64,
}

struct CachedToken {
  access_token: String,
  refresh_at:   Instant,
}

pub struct OfflineTokenAuth {
  http:          Client,
  token_url:     String,
  client_id:     String,
  offline_token: String,
  cached:        Mutex<Option<CachedToken>>,
}

impl OfflineTokenAuth {
  pub fn new(
    http: Client,
    token_url: impl Into<String>,
    client_id: impl Into<String>,
    offline_token: impl Into<String>,
  ) -> Self {
    Self {
      http,
      token_url: token_url.into(),
      client_id: client_id.into(),
      offline_token: offline_token.into(),
      cached: Mutex::new(None),
    }
  }

  /// A valid access token, exchanging the offline token if needed.
  pub async fn access_token(&self) -> Result<String> {
    // Held across the exchange so concurrent callers share one refresh.
    let mut cached = self.cached.lock().await;
    if let Some(token) = cached.as_ref()
      && Instant::now() < token.refresh_at
    {
      return Ok(token.access_token.clone());
    }

    tracing::debug!(token_url = %self.token_url, "exchanging offline token");
    let resp = self
      .http
      .post(&self.token_url)
      .form(&[
        ("grant_type", "refresh_token"),
        ("client_id", self.client_id.as_str()),
        ("refresh_token", self.offline_token.as_str()),
      ])
      .send()
      .await?;

    let status = resp.status();
    if !status.is_success() {
      let body = resp.text().await.unwrap_or_default();
      return Err(ClientError::Auth { status, body });
    }

    let token: TokenResponse = resp.json().await?;
    let lifetime = Duration::from_secs(token.expires_in).saturating_sub(EXPIRY_MARGIN);
    *cached = Some(CachedToken {
      access_token: token.access_token.clone(),
      refresh_at:   Instant::now() + lifetime,
    });
    Ok(token.access_token)
  }
}
