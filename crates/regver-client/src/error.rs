//! Error type for `regver-client`.

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  /// The registry answered with a status the client has no meaning for.
  #[error("{method} {path} → {status}: {body}")]
  Status {
    method: &'static str,
    path:   String,
    status: StatusCode,
    body:   String,
  },

  #[error("token exchange failed ({status}): {body}")]
  Auth { status: StatusCode, body: String },
}

pub type Result<T, E = ClientError> = std::result::Result<T, E>;
