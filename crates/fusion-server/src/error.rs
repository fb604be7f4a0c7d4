//! Startup errors. Request-time errors are `fusion_api::ApiError`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("configuration error: {0}")]
  Config(#[from] config::ConfigError),

  #[error("store error: {0}")]
  Store(#[from] fusion_store_sqlite::Error),

  #[error("upstream client error: {0}")]
  Upstream(#[from] fusion_upstream::Error),

  #[error("identity client error: {0}")]
  Identity(#[from] fusion_auth::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
