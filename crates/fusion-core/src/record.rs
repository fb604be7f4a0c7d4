//! Record types: what the upstream services return and what gets persisted.
//!
//! [`Subject`] and [`ConditionReading`] are transient: they live for one
//! request and are discarded once fused. [`FusedRecord`] and [`CustomRecord`]
//! are written once and never updated.

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use uuid::Uuid;

use crate::{Result, store::StoredItem};

// ─── Upstream views ──────────────────────────────────────────────────────────

/// A registry subject joined with its habitat's attributes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subject {
  pub id:                String,
  pub display_name:      String,
  pub habitat_name:      String,
  /// Climate classification, lower-cased.
  pub habitat_condition: String,
}

/// Current weather for the locale a habitat maps to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditionReading {
  pub temperature_celsius: i32,
  pub description:         String,
  pub humidity_percent:    u8,
}

// ─── Persisted records ───────────────────────────────────────────────────────

/// The kind of a persisted record. Doubles as the durable-store partition
/// and as the item id namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
  Fused,
  Custom,
}

impl RecordKind {
  /// Partition key under which records of this kind are stored.
  pub fn partition(self) -> &'static str {
    match self {
      Self::Fused => "fused",
      Self::Custom => "custom",
    }
  }

  /// Namespaced item id, e.g. `fused_<uuid>`.
  pub fn item_id(self, id: Uuid) -> String {
    format!("{}_{}", self.partition(), id)
  }
}

/// A subject fused with the current conditions in its habitat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FusedRecord {
  pub id:                      Uuid,
  pub subject_name:            String,
  pub habitat_name:            String,
  pub habitat_condition:       String,
  pub reading:                 ConditionReading,
  pub created_at_epoch_millis: i64,
}

impl FusedRecord {
  pub fn fuse(subject: Subject, reading: ConditionReading, created_at: i64) -> Self {
    Self {
      id: Uuid::new_v4(),
      subject_name: subject.display_name,
      habitat_name: subject.habitat_name,
      habitat_condition: subject.habitat_condition,
      reading,
      created_at_epoch_millis: created_at,
    }
  }
}

/// A free-form record submitted through `POST /custom`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomRecord {
  pub id:                      Uuid,
  pub name:                    String,
  pub description:             String,
  pub created_at_epoch_millis: i64,
}

/// Unvalidated input to [`crate::FusionService::store_custom`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewCustomRecord {
  pub name:        Option<String>,
  pub description: Option<String>,
}

// ─── Durable encoding ────────────────────────────────────────────────────────

/// Anything that can be written to and read back from the durable store.
pub trait Persisted: Serialize + DeserializeOwned {
  const KIND: RecordKind;

  fn id(&self) -> Uuid;
  fn created_at(&self) -> i64;

  fn to_item(&self) -> Result<StoredItem> {
    Ok(StoredItem {
      partition: Self::KIND.partition().to_owned(),
      item_id:   Self::KIND.item_id(self.id()),
      sort_key:  self.created_at(),
      body:      serde_json::to_value(self)?,
    })
  }

  fn from_item(item: StoredItem) -> Result<Self> {
    Ok(serde_json::from_value(item.body)?)
  }
}

impl Persisted for FusedRecord {
  const KIND: RecordKind = RecordKind::Fused;

  fn id(&self) -> Uuid { self.id }

  fn created_at(&self) -> i64 { self.created_at_epoch_millis }
}

impl Persisted for CustomRecord {
  const KIND: RecordKind = RecordKind::Custom;

  fn id(&self) -> Uuid { self.id }

  fn created_at(&self) -> i64 { self.created_at_epoch_millis }
}
