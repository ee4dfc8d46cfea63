//! Entities and their mapping to raw JSON records

mod log;

pub use log::{Log, LogDto};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::repository::RepositoryError;
use crate::schema::{FieldError, Schema, ValidationErrors};
use crate::store::{Datastore, Document};

/// Every entity variant the datastore knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
  Log,
}

impl EntityKind {
  pub const ALL: &'static [EntityKind] = &[EntityKind::Log];

  /// Display name used in user-facing messages
  pub fn name(&self) -> &'static str {
    match self {
      Self::Log => "Log",
    }
  }

  /// Name of the collection holding this variant
  pub fn db_key(&self) -> &'static str {
    match self {
      Self::Log => "logs",
    }
  }

  /// Required checks for an incoming DTO of this variant
  pub fn schema(&self) -> Schema {
    match self {
      Self::Log => Log::schema(),
    }
  }

  /// Collection names of every variant, for bootstrapping a new document
  pub fn db_keys() -> impl Iterator<Item = &'static str> {
    Self::ALL.iter().map(EntityKind::db_key)
  }
}

/// Contract between an entity variant and the generic repository.
///
/// The raw form of an entity is its `Serialize` output; the DTO is the write
/// payload without identity or construction-time fields.
#[async_trait]
pub trait Entity: Serialize + DeserializeOwned + Send + Sync + Sized + 'static {
  type Dto: DeserializeOwned + Send;

  const KIND: EntityKind;

  /// Build a new entity with a freshly generated identity
  fn create(dto: Self::Dto) -> Self;

  /// Build an entity under a known identity
  fn from_object(uuid: String, dto: Self::Dto) -> Self;

  fn uuid(&self) -> Option<&str>;

  fn db_key() -> &'static str {
    Self::KIND.db_key()
  }

  /// Check an untyped payload against the variant's schema and decode it.
  fn assert_valid_dto(payload: &Value) -> Result<Self::Dto, ValidationErrors> {
    Self::KIND.schema().validate(payload)?;
    serde_json::from_value(payload.clone())
      .map_err(|e| ValidationErrors::from(FieldError::Malformed(e.to_string())))
  }

  fn to_raw(&self) -> Result<Value, RepositoryError> {
    serde_json::to_value(self).map_err(|source| RepositoryError::Encode {
      collection: Self::db_key(),
      source,
    })
  }

  /// Rebuild an entity exactly as it was stored
  fn from_raw(raw: Value) -> Result<Self, RepositoryError> {
    serde_json::from_value(raw).map_err(|source| RepositoryError::Corrupt {
      collection: Self::db_key(),
      source,
    })
  }

  fn require_uuid(&self) -> Result<&str, RepositoryError> {
    self
      .uuid()
      .filter(|uuid| !uuid.is_empty())
      .ok_or(RepositoryError::MissingIdentity {
        collection: Self::db_key(),
      })
  }

  /// Append the raw form to this variant's collection
  fn insert_into(&self, document: &mut Document) -> Result<(), RepositoryError> {
    let uuid = self.require_uuid()?;
    if document.contains(Self::db_key(), uuid) {
      return Err(RepositoryError::DuplicateIdentity {
        uuid: uuid.to_string(),
      });
    }
    document.push(Self::db_key(), self.to_raw()?);
    Ok(())
  }

  /// Splice the stored record with this identity out of the collection
  fn remove_from(&self, document: &mut Document) -> Result<Value, RepositoryError> {
    let uuid = self.require_uuid()?;
    document
      .remove(Self::db_key(), uuid)
      .ok_or_else(|| RepositoryError::NotFound {
        uuid: uuid.to_string(),
      })
  }

  async fn save_to_db(&self, store: &Datastore) -> Result<(), RepositoryError> {
    store.transaction(|doc| self.insert_into(doc)).await
  }

  async fn remove_from_db(&self, store: &Datastore) -> Result<(), RepositoryError> {
    store
      .transaction(|doc| self.remove_from(doc).map(|_| ()))
      .await
  }
}
