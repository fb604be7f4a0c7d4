//! Error type for `fusion-auth`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// The identity provider refused the credentials or the refresh token.
  #[error("authentication rejected: {0}")]
  Rejected(String),

  /// A token could not be decoded locally.
  #[error("invalid token format: {0}")]
  TokenFormat(String),

  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  #[error("identity provider returned {status}: {body}")]
  Status {
    status: reqwest::StatusCode,
    body:   String,
  },

  #[error("malformed identity provider response: {0}")]
  Malformed(String),
}

impl Error {
  /// `true` when the provider answered and said no, as opposed to being
  /// unreachable or answering nonsense.
  pub fn is_rejection(&self) -> bool { matches!(self, Self::Rejected(_)) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
