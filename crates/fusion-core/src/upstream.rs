//! Traits for the two external services the orchestrator fuses.

use std::future::Future;

use crate::record::{ConditionReading, Subject};

/// The subject registry (a character database).
pub trait SubjectRegistry: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Fetch a subject and the attributes of its habitat.
  fn fetch_subject(
    &self,
    subject_id: &str,
  ) -> impl Future<Output = Result<Subject, Self::Error>> + Send;
}

/// The condition (weather) service.
pub trait ConditionSource: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Fetch current conditions for the real-world locale `habitat` maps to.
  fn current_conditions(
    &self,
    habitat: &str,
  ) -> impl Future<Output = Result<ConditionReading, Self::Error>> + Send;
}
