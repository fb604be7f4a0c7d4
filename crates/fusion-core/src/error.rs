//! Error types for `fusion-core`.

use thiserror::Error;

use crate::{BoxError, observe::Step};

#[derive(Debug, Error)]
pub enum Error {
  /// Required input was absent or blank. Raised before any I/O.
  #[error("missing required field: {0}")]
  Validation(&'static str),

  /// The registry or the condition service failed.
  #[error("{step} failed: {source}")]
  UpstreamFetch {
    step:   Step,
    #[source]
    source: BoxError,
  },

  /// The durable store rejected a write or a query.
  #[error("persistence error: {0}")]
  Persistence(#[source] BoxError),

  /// A record could not be encoded for storage, or a stored row could not
  /// be turned back into a record.
  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

impl Error {
  /// `true` for errors caused by the caller's input rather than the service.
  pub fn is_validation(&self) -> bool { matches!(self, Self::Validation(_)) }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
