//! Observer hook invoked around every external step of the orchestrator.
//!
//! The orchestrator holds an `Arc<dyn Observer>`; the server installs
//! [`TracingObserver`] and offline mode installs [`NoopObserver`].

use std::{fmt, time::Duration};

/// One external call made by the orchestrator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
  CacheLookup,
  RegistryFetch,
  ConditionFetch,
  Persist,
  CacheWrite,
  HistoryQuery,
}

impl Step {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::CacheLookup => "cache_lookup",
      Self::RegistryFetch => "registry_fetch",
      Self::ConditionFetch => "condition_fetch",
      Self::Persist => "persist",
      Self::CacheWrite => "cache_write",
      Self::HistoryQuery => "history_query",
    }
  }
}

impl fmt::Display for Step {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// How a step ended.
#[derive(Debug, Clone, Copy)]
pub enum Outcome<'a> {
  Ok,
  Failed(&'a (dyn std::error::Error + 'static)),
}

impl Outcome<'_> {
  pub fn is_ok(&self) -> bool { matches!(self, Self::Ok) }
}

pub trait Observer: Send + Sync {
  fn step_started(&self, _step: Step) {}

  fn step_finished(&self, _step: Step, _elapsed: Duration, _outcome: Outcome<'_>) {}
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl Observer for NoopObserver {}

/// Emits one `tracing` event per finished step.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl Observer for TracingObserver {
  fn step_started(&self, step: Step) {
    tracing::trace!(step = step.as_str(), "step started");
  }

  fn step_finished(&self, step: Step, elapsed: Duration, outcome: Outcome<'_>) {
    let elapsed_ms = elapsed.as_millis() as u64;
    match outcome {
      Outcome::Ok => {
        tracing::debug!(step = step.as_str(), elapsed_ms, "step finished");
      }
      Outcome::Failed(error) => {
        tracing::warn!(step = step.as_str(), elapsed_ms, %error, "step failed");
      }
    }
  }
}
