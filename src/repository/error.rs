use thiserror::Error;

use crate::store::StoreError;

/// Errors raised by entity persistence and the repository
#[derive(Debug, Error)]
pub enum RepositoryError {
  #[error("No entity found with uuid '{uuid}'")]
  NotFound { uuid: String },

  /// An entity reached the datastore without an identity
  #[error("entity for '{collection}' has no uuid")]
  MissingIdentity { collection: &'static str },

  #[error("an entity with uuid '{uuid}' is already stored")]
  DuplicateIdentity { uuid: String },

  #[error("stored record in '{collection}' is malformed: {source}")]
  Corrupt {
    collection: &'static str,
    source: serde_json::Error,
  },

  #[error("failed to encode entity for '{collection}': {source}")]
  Encode {
    collection: &'static str,
    source: serde_json::Error,
  },

  #[error(transparent)]
  Store(#[from] StoreError),
}

impl RepositoryError {
  pub fn is_not_found(&self) -> bool {
    matches!(self, Self::NotFound { .. })
  }
}
