//! SQL schema for the fusion SQLite store.
//!
//! Table names are configurable, so the DDL is rendered at startup from
//! validated [`TableName`]s instead of being a single constant.

use std::fmt;

use crate::{Error, Result};

/// A table name that is safe to interpolate into SQL: ASCII letters, digits
/// and underscores, not starting with a digit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableName(String);

impl TableName {
  pub fn parse(name: &str) -> Result<Self> {
    let mut chars = name.chars();
    let valid_start = chars
      .next()
      .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    if valid_start && chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
      Ok(Self(name.to_owned()))
    } else {
      Err(Error::InvalidTableName(name.to_owned()))
    }
  }
}

impl fmt::Display for TableName {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

/// The two tables backing a [`crate::SqliteStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tables {
  pub cache: TableName,
  pub data:  TableName,
}

impl Tables {
  pub fn new(cache: &str, data: &str) -> Result<Self> {
    Ok(Self { cache: TableName::parse(cache)?, data: TableName::parse(data)? })
  }
}

impl Default for Tables {
  fn default() -> Self {
    Self {
      cache: TableName("fusion_cache".to_owned()),
      data:  TableName("fusion_data".to_owned()),
    }
  }
}

/// Full schema DDL; idempotent thanks to `CREATE ... IF NOT EXISTS`.
pub fn render(tables: &Tables) -> String {
  let Tables { cache, data } = tables;
  format!(
    "
PRAGMA journal_mode = WAL;

-- Cache rows may outlive their expiry until purged; readers re-check.
CREATE TABLE IF NOT EXISTS {cache} (
    cache_key   TEXT PRIMARY KEY,
    payload     TEXT NOT NULL,     -- JSON
    expires_at  INTEGER NOT NULL   -- epoch seconds
);

-- Append-only. No UPDATE or DELETE is ever issued against this table.
CREATE TABLE IF NOT EXISTS {data} (
    item_id     TEXT PRIMARY KEY,  -- '<kind>_<uuid>'
    partition   TEXT NOT NULL,     -- 'fused' | 'custom'
    sort_key    INTEGER NOT NULL,  -- creation time, epoch millis
    body        TEXT NOT NULL      -- JSON
);

CREATE INDEX IF NOT EXISTS {cache}_expires_idx   ON {cache}(expires_at);
CREATE INDEX IF NOT EXISTS {data}_partition_idx  ON {data}(partition, sort_key DESC);

PRAGMA user_version = 1;
"
  )
}
