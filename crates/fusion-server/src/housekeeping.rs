//! Background purge of expired cache rows.
//!
//! Reads never return an expired entry, so this only bounds table growth.

use std::time::Duration;

use chrono::Utc;
use fusion_store_sqlite::SqliteStore;
use tokio::{task::JoinHandle, time::MissedTickBehavior};

/// Purge every `every`, starting immediately. Returns `None` when `every`
/// is zero.
pub fn spawn(store: SqliteStore, every: Duration) -> Option<JoinHandle<()>> {
  if every.is_zero() {
    tracing::info!("cache purge disabled");
    return None;
  }

  Some(tokio::spawn(async move {
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
      ticker.tick().await;
      match store.purge_expired(Utc::now().timestamp()).await {
        Ok(0) => {}
        Ok(removed) => tracing::info!(removed, "purged expired cache entries"),
        Err(error) => tracing::warn!(%error, "cache purge failed"),
      }
    }
  }))
}

#[cfg(test)]
mod tests {
  use fusion_core::cache::{CacheEntry, CacheStore};
  use serde_json::json;

  use super::*;

  #[tokio::test]
  async fn zero_interval_disables_purge() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    assert!(spawn(store, Duration::ZERO).is_none());
  }

  #[tokio::test]
  async fn expired_rows_are_removed() {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let now = Utc::now().timestamp();
    for (key, expires_at) in [("stale", now - 10), ("fresh", now + 600)] {
      store
        .put(CacheEntry {
          key:                      key.into(),
          payload:                  json!({}),
          expires_at_epoch_seconds: expires_at,
        })
        .await
        .unwrap();
    }

    let task = spawn(store.clone(), Duration::from_millis(10)).unwrap();
    let mut purged = false;
    for _ in 0..200 {
      if store.get("stale").await.unwrap().is_none() {
        purged = true;
        break;
      }
      tokio::time::sleep(Duration::from_millis(10)).await;
    }
    task.abort();

    assert!(purged);
    assert!(store.get("fresh").await.unwrap().is_some());
  }
}
