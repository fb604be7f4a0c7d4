//! Conversions between core types and the plain values stored in SQLite
//! columns.
//!
//! JSON payloads and bodies are stored as compact text. Timestamps are
//! stored as integers (seconds for cache expiry, milliseconds for sort keys).

use fusion_core::{cache::CacheEntry, store::StoredItem};

use crate::Result;

// ─── JSON ────────────────────────────────────────────────────────────────────

pub fn encode_json(value: &serde_json::Value) -> Result<String> {
  Ok(serde_json::to_string(value)?)
}

pub fn decode_json(s: &str) -> Result<serde_json::Value> {
  Ok(serde_json::from_str(s)?)
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a cache row.
pub struct RawCacheEntry {
  pub cache_key:  String,
  pub payload:    String,
  pub expires_at: i64,
}

impl RawCacheEntry {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      cache_key:  row.get(0)?,
      payload:    row.get(1)?,
      expires_at: row.get(2)?,
    })
  }

  pub fn into_entry(self) -> Result<CacheEntry> {
    Ok(CacheEntry {
      key:                      self.cache_key,
      payload:                  decode_json(&self.payload)?,
      expires_at_epoch_seconds: self.expires_at,
    })
  }
}

/// Raw values read directly from a data row.
pub struct RawItem {
  pub item_id:   String,
  pub partition: String,
  pub sort_key:  i64,
  pub body:      String,
}

impl RawItem {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      item_id:   row.get(0)?,
      partition: row.get(1)?,
      sort_key:  row.get(2)?,
      body:      row.get(3)?,
    })
  }

  pub fn into_item(self) -> Result<StoredItem> {
    Ok(StoredItem {
      partition: self.partition,
      item_id:   self.item_id,
      sort_key:  self.sort_key,
      body:      decode_json(&self.body)?,
    })
  }
}
