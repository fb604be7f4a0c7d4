//! The `DurableStore` trait and the row shape it persists.
//!
//! The trait is implemented by storage backends (e.g. `fusion-store-sqlite`).
//! The orchestrator depends on this abstraction, never on a concrete
//! backend.

use std::future::Future;

/// One persisted row.
///
/// Records of every kind share one physical store: `partition` groups them
/// for range queries and `item_id` carries a kind prefix so ids never
/// collide across kinds.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredItem {
  pub partition: String,
  pub item_id:   String,
  /// Creation time in epoch milliseconds; range queries sort on it.
  pub sort_key:  i64,
  pub body:      serde_json::Value,
}

/// Append-style persistence with a reverse-chronological range query.
///
/// Items are never updated or deleted through this trait.
pub trait DurableStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Insert a new item. Writing an `item_id` that already exists is an
  /// error.
  fn put(
    &self,
    item: StoredItem,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send;

  /// Return up to `limit` items of `partition`, newest first.
  ///
  /// With `start_after`, only items whose sort key is strictly lower are
  /// returned, so a page can resume from the last sort key seen.
  fn query_range(
    &self,
    partition: &str,
    limit: usize,
    start_after: Option<i64>,
  ) -> impl Future<Output = Result<Vec<StoredItem>, Self::Error>> + Send;
}
