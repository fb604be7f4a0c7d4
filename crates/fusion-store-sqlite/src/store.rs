//! [`SqliteStore`] — the SQLite implementation of [`CacheStore`] and
//! [`DurableStore`].

use std::path::Path;

use fusion_core::{
  cache::{CacheEntry, CacheStore},
  store::{DurableStore, StoredItem},
};
use rusqlite::OptionalExtension as _;

use crate::{
  Error, Result,
  encode::{RawCacheEntry, RawItem, encode_json},
  schema::{self, Tables},
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// Cache and durable store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn:   tokio_rusqlite::Connection,
  tables: Tables,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>, tables: Tables) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn, tables };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store with the default table names, useful for
  /// testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn, tables: Tables::default() };
    store.init_schema().await?;
    Ok(store)
  }

  pub fn tables(&self) -> &Tables { &self.tables }

  async fn init_schema(&self) -> Result<()> {
    let ddl = schema::render(&self.tables);
    self
      .conn
      .call(move |conn| {
        conn.execute_batch(&ddl)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Physically delete cache rows that expired before `now_epoch_seconds`.
  /// Returns the number of rows removed.
  pub async fn purge_expired(&self, now_epoch_seconds: i64) -> Result<usize> {
    let sql = format!("DELETE FROM {} WHERE expires_at < ?1", self.tables.cache);
    let removed = self
      .conn
      .call(move |conn| Ok(conn.execute(&sql, rusqlite::params![now_epoch_seconds])?))
      .await?;
    Ok(removed)
  }
}

// ─── CacheStore impl ─────────────────────────────────────────────────────────

impl CacheStore for SqliteStore {
  type Error = Error;

  async fn get(&self, key: &str) -> Result<Option<CacheEntry>> {
    let sql = format!(
      "SELECT cache_key, payload, expires_at FROM {} WHERE cache_key = ?1",
      self.tables.cache
    );
    let key = key.to_owned();

    let raw: Option<RawCacheEntry> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(&sql, rusqlite::params![key], RawCacheEntry::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawCacheEntry::into_entry).transpose()
  }

  async fn put(&self, entry: CacheEntry) -> Result<()> {
    let sql = format!(
      "INSERT OR REPLACE INTO {} (cache_key, payload, expires_at) VALUES (?1, ?2, ?3)",
      self.tables.cache
    );
    let payload = encode_json(&entry.payload)?;
    let CacheEntry { key, expires_at_epoch_seconds, .. } = entry;

    self
      .conn
      .call(move |conn| {
        conn.execute(&sql, rusqlite::params![key, payload, expires_at_epoch_seconds])?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── DurableStore impl ───────────────────────────────────────────────────────

impl DurableStore for SqliteStore {
  type Error = Error;

  async fn put(&self, item: StoredItem) -> Result<()> {
    let sql = format!(
      "INSERT INTO {} (item_id, partition, sort_key, body) VALUES (?1, ?2, ?3, ?4)",
      self.tables.data
    );
    let body = encode_json(&item.body)?;
    let StoredItem { partition, item_id, sort_key, .. } = item;
    let id_for_error = item_id.clone();

    let inserted: bool = self
      .conn
      .call(move |conn| {
        match conn.execute(&sql, rusqlite::params![item_id, partition, sort_key, body]) {
          Ok(_) => Ok(true),
          Err(rusqlite::Error::SqliteFailure(e, _))
            if e.code == rusqlite::ErrorCode::ConstraintViolation =>
          {
            Ok(false)
          }
          Err(e) => Err(e.into()),
        }
      })
      .await?;

    if !inserted {
      return Err(Error::DuplicateItem(id_for_error));
    }
    Ok(())
  }

  async fn query_range(
    &self,
    partition:   &str,
    limit:       usize,
    start_after: Option<i64>,
  ) -> Result<Vec<StoredItem>> {
    let sql = format!(
      "SELECT item_id, partition, sort_key, body
       FROM {}
       WHERE partition = ?1
         AND (?2 IS NULL OR sort_key < ?2)
       ORDER BY sort_key DESC, item_id DESC
       LIMIT ?3",
      self.tables.data
    );
    let partition = partition.to_owned();
    let limit_val = i64::try_from(limit).unwrap_or(i64::MAX);

    let raws: Vec<RawItem> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(
            rusqlite::params![partition, start_after, limit_val],
            RawItem::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    tracing::debug!(returned = raws.len(), "range query");
    raws.into_iter().map(RawItem::into_item).collect()
  }
}
