//! The fusion orchestrator.
//!
//! [`FusionService`] answers the three data operations of the service:
//!
//! | Operation | Steps |
//! |-----------|-------|
//! | [`fused_record`](FusionService::fused_record) | cache lookup → registry → conditions → persist → cache write |
//! | [`history`](FusionService::history) | range query over the `fused` partition |
//! | [`store_custom`](FusionService::store_custom) | validate → persist |
//!
//! Steps run strictly in order; each depends on the previous one's output.
//! Nothing is retried. Concurrent cache misses for the same key are not
//! coalesced: both requests fetch, persist and write the cache.

use std::{
  future::Future,
  sync::{
    Arc,
    atomic::{AtomicI64, Ordering},
  },
  time::{Duration, Instant},
};

use uuid::Uuid;

use crate::{
  Error, Result,
  cache::{CacheEntry, CacheStore, DEFAULT_TTL},
  clock::{Clock, SystemClock},
  observe::{NoopObserver, Observer, Outcome, Step},
  record::{CustomRecord, FusedRecord, NewCustomRecord, Persisted as _, RecordKind},
  store::DurableStore,
  upstream::{ConditionSource, SubjectRegistry},
};

/// Subject looked up when a request does not name one.
pub const DEFAULT_SUBJECT_ID: &str = "1";

const CACHE_KEY_PREFIX: &str = "character_";

pub const DEFAULT_HISTORY_LIMIT: usize = 10;
pub const MAX_HISTORY_LIMIT: usize = 100;

/// Cache key under which the fused record for `subject_id` is stored.
pub fn cache_key(subject_id: &str) -> String {
  format!("{CACHE_KEY_PREFIX}{subject_id}")
}

// ─── Collaborators ───────────────────────────────────────────────────────────

/// The set of collaborators a [`FusionService`] is built from.
///
/// Implemented by zero-sized marker types so that handlers only need a
/// single type parameter.
pub trait Backend: Send + Sync + 'static {
  type Cache: CacheStore;
  type Store: DurableStore;
  type Registry: SubjectRegistry;
  type Conditions: ConditionSource;
}

// ─── History query ───────────────────────────────────────────────────────────

/// A page request against the fused-record history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryQuery {
  pub limit:  usize,
  /// Creation timestamp of the last record on the previous page.
  pub cursor: Option<i64>,
}

impl Default for HistoryQuery {
  fn default() -> Self {
    Self { limit: DEFAULT_HISTORY_LIMIT, cursor: None }
  }
}

impl HistoryQuery {
  /// Interpret raw query-string values. A missing, non-numeric or
  /// non-positive limit falls back to the default; a non-numeric cursor is
  /// ignored.
  pub fn parse(limit: Option<&str>, cursor: Option<&str>) -> Self {
    let limit = limit
      .and_then(|l| l.trim().parse::<usize>().ok())
      .filter(|l| *l > 0)
      .map_or(DEFAULT_HISTORY_LIMIT, |l| l.min(MAX_HISTORY_LIMIT));
    let cursor = cursor.and_then(|c| c.trim().parse::<i64>().ok());
    Self { limit, cursor }
  }
}

// ─── Service ─────────────────────────────────────────────────────────────────

pub struct FusionService<B: Backend> {
  cache:      B::Cache,
  store:      B::Store,
  registry:   B::Registry,
  conditions: B::Conditions,
  observer:   Arc<dyn Observer>,
  clock:      Arc<dyn Clock>,
  cache_ttl:  Duration,
  /// Highest creation stamp handed out so far.
  last_stamp: AtomicI64,
}

impl<B: Backend> FusionService<B> {
  pub fn new(
    cache: B::Cache,
    store: B::Store,
    registry: B::Registry,
    conditions: B::Conditions,
  ) -> Self {
    Self {
      cache,
      store,
      registry,
      conditions,
      observer: Arc::new(NoopObserver),
      clock: Arc::new(SystemClock),
      cache_ttl: DEFAULT_TTL,
      last_stamp: AtomicI64::new(i64::MIN),
    }
  }

  pub fn with_observer(mut self, observer: Arc<dyn Observer>) -> Self {
    self.observer = observer;
    self
  }

  pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
    self.clock = clock;
    self
  }

  pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
    self.cache_ttl = ttl;
    self
  }

  pub fn clock(&self) -> &dyn Clock { self.clock.as_ref() }

  // ── Get fused record ──────────────────────────────────────────────────────

  /// Return the fused record for `subject_id`, from the cache when a fresh
  /// entry exists, otherwise by running the full pipeline.
  ///
  /// Upstream and persistence failures abort without populating the cache.
  /// A failed cache write is logged and reported to the observer but the
  /// record is still returned.
  pub async fn fused_record(&self, subject_id: &str) -> Result<FusedRecord> {
    let key = cache_key(subject_id);

    if let Some(record) = self.cached(&key).await {
      tracing::info!(cache_key = %key, record_id = %record.id, "cache hit");
      return Ok(record);
    }

    let subject = self
      .observed(Step::RegistryFetch, self.registry.fetch_subject(subject_id))
      .await
      .map_err(|e| Error::UpstreamFetch {
        step:   Step::RegistryFetch,
        source: Box::new(e),
      })?;

    let reading = self
      .observed(
        Step::ConditionFetch,
        self.conditions.current_conditions(&subject.habitat_name),
      )
      .await
      .map_err(|e| Error::UpstreamFetch {
        step:   Step::ConditionFetch,
        source: Box::new(e),
      })?;

    let record = FusedRecord::fuse(subject, reading, self.stamp());

    self
      .observed(Step::Persist, self.store.put(record.to_item()?))
      .await
      .map_err(|e| Error::Persistence(Box::new(e)))?;

    self.populate(key, &record).await;

    tracing::info!(subject_id, record_id = %record.id, "data fused and stored");
    Ok(record)
  }

  /// A fresh, decodable cache entry for `key`. Lookup failures, stale
  /// entries and undecodable payloads all count as a miss.
  async fn cached(&self, key: &str) -> Option<FusedRecord> {
    let entry = match self.observed(Step::CacheLookup, self.cache.get(key)).await {
      Ok(Some(entry)) => entry,
      Ok(None) => return None,
      Err(error) => {
        tracing::warn!(cache_key = key, %error, "cache lookup failed, treating as miss");
        return None;
      }
    };

    if !entry.is_fresh(self.clock.now()) {
      tracing::debug!(
        cache_key = key,
        expired_at = entry.expires_at_epoch_seconds,
        "cache entry expired"
      );
      return None;
    }

    match serde_json::from_value(entry.payload) {
      Ok(record) => Some(record),
      Err(error) => {
        tracing::warn!(cache_key = key, %error, "cached payload is not a fused record");
        None
      }
    }
  }

  async fn populate(&self, key: String, record: &FusedRecord) {
    let payload = match serde_json::to_value(record) {
      Ok(payload) => payload,
      Err(error) => {
        tracing::warn!(cache_key = %key, %error, "cannot encode record for cache");
        return;
      }
    };

    let entry = CacheEntry::new(key.clone(), payload, self.clock.now(), self.cache_ttl);
    if let Err(error) = self.observed(Step::CacheWrite, self.cache.put(entry)).await {
      tracing::warn!(cache_key = %key, %error, "cache write failed");
    }
  }

  // ── History ───────────────────────────────────────────────────────────────

  /// Fused records, newest first, at most `query.limit` of them.
  pub async fn history(&self, query: HistoryQuery) -> Result<Vec<FusedRecord>> {
    let items = self
      .observed(
        Step::HistoryQuery,
        self
          .store
          .query_range(RecordKind::Fused.partition(), query.limit, query.cursor),
      )
      .await
      .map_err(|e| Error::Persistence(Box::new(e)))?;

    let records = items
      .into_iter()
      .map(FusedRecord::from_item)
      .collect::<Result<Vec<_>>>()?;

    tracing::info!(
      limit = query.limit,
      cursor = query.cursor,
      returned = records.len(),
      "history retrieved"
    );
    Ok(records)
  }

  // ── Custom records ────────────────────────────────────────────────────────

  /// Validate and persist a custom record. Validation happens before any
  /// I/O; the stored values are exactly the ones supplied.
  pub async fn store_custom(&self, input: NewCustomRecord) -> Result<CustomRecord> {
    let name = required(input.name, "name")?;
    let description = required(input.description, "description")?;

    let record = CustomRecord {
      id: Uuid::new_v4(),
      name,
      description,
      created_at_epoch_millis: self.stamp(),
    };

    self
      .observed(Step::Persist, self.store.put(record.to_item()?))
      .await
      .map_err(|e| Error::Persistence(Box::new(e)))?;

    tracing::info!(record_id = %record.id, "custom record stored");
    Ok(record)
  }

  // ── Helpers ───────────────────────────────────────────────────────────────

  /// Current time in epoch milliseconds, bumped past the last stamp this
  /// instance handed out. Stamps are unique per instance, so an exclusive
  /// history cursor never skips a record.
  fn stamp(&self) -> i64 {
    let now = self.clock.now().timestamp_millis();
    let next = |previous: i64| now.max(previous.saturating_add(1));
    match self
      .last_stamp
      .fetch_update(Ordering::AcqRel, Ordering::Acquire, |previous| Some(next(previous)))
    {
      Ok(previous) | Err(previous) => next(previous),
    }
  }

  async fn observed<T, E>(
    &self,
    step: Step,
    call: impl Future<Output = std::result::Result<T, E>>,
  ) -> std::result::Result<T, E>
  where
    E: std::error::Error + 'static,
  {
    self.observer.step_started(step);
    let started = Instant::now();
    let result = call.await;
    let outcome = match &result {
      Ok(_) => Outcome::Ok,
      Err(e) => Outcome::Failed(e),
    };
    self.observer.step_finished(step, started.elapsed(), outcome);
    result
  }
}

fn required(value: Option<String>, field: &'static str) -> Result<String> {
  match value {
    Some(v) if !v.trim().is_empty() => Ok(v),
    _ => Err(Error::Validation(field)),
  }
}
