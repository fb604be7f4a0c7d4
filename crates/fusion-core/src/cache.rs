//! The `CacheStore` trait and the entries it holds.
//!
//! Expiry is advisory to the store: a backend may keep stale rows around
//! until some housekeeping pass removes them. Readers must call
//! [`CacheEntry::is_fresh`] rather than trust a returned entry.

use std::{future::Future, time::Duration};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How long a fused record stays in the cache.
pub const DEFAULT_TTL: Duration = Duration::from_secs(30 * 60);

/// A cached payload together with its absolute expiry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
  pub key:                      String,
  pub payload:                  serde_json::Value,
  pub expires_at_epoch_seconds: i64,
}

impl CacheEntry {
  /// Build an entry that expires `ttl` after `now`.
  pub fn new(
    key: impl Into<String>,
    payload: serde_json::Value,
    now: DateTime<Utc>,
    ttl: Duration,
  ) -> Self {
    let ttl_secs = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
    Self {
      key: key.into(),
      payload,
      expires_at_epoch_seconds: now.timestamp().saturating_add(ttl_secs),
    }
  }

  /// An entry is fresh up to and including its expiry second.
  pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
    now.timestamp() <= self.expires_at_epoch_seconds
  }
}

/// Key-value store with TTL-based expiry.
pub trait CacheStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Look up `key`. May return an entry that has already expired.
  fn get(
    &self,
    key: &str,
  ) -> impl Future<Output = Result<Option<CacheEntry>, Self::Error>> + Send;

  /// Insert or overwrite the entry stored under `entry.key`.
  fn put(
    &self,
    entry: CacheEntry,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send;
}
