//! Error type for `fusion-upstream`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("GET {url} → {status}")]
  Status {
    url:    String,
    status: reqwest::StatusCode,
  },

  #[error("malformed response from {url}: {reason}")]
  Malformed { url: String, reason: String },

  #[error("invalid subject id: {0:?}")]
  InvalidSubjectId(String),

  #[error("invalid base url {0:?}")]
  InvalidBaseUrl(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
