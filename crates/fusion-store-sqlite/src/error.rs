//! Error type for `fusion-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  /// A configured table name is not a plain SQL identifier.
  #[error("invalid table name: {0:?}")]
  InvalidTableName(String),

  /// An item with the same id was already stored.
  #[error("item already exists: {0}")]
  DuplicateItem(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
