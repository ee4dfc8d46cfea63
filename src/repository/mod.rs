//! Generic CRUD over one entity collection
//!
//! Each operation is a single load -> mutate -> store pass over the whole
//! document; nothing is cached between calls.

mod error;

pub use error::RepositoryError;

use serde_json::Value;
use std::marker::PhantomData;

use crate::entity::Entity;
use crate::store::{record_uuid, Datastore};

/// CRUD operations for entity variant `E`
pub struct Repository<E: Entity> {
  store: Datastore,
  _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> Repository<E> {
  pub fn new(store: Datastore) -> Self {
    Self {
      store,
      _entity: PhantomData,
    }
  }

  pub fn store(&self) -> &Datastore {
    &self.store
  }

  /// Raw records of the collection in stored order
  pub async fn get_all(&self) -> Result<Vec<Value>, RepositoryError> {
    let document = self.store.load().await?;
    Ok(document.into_collection(E::db_key()))
  }

  pub async fn get(&self, uuid: &str) -> Result<Value, RepositoryError> {
    self
      .get_all()
      .await?
      .into_iter()
      .find(|record| record_uuid(record) == Some(uuid))
      .ok_or_else(|| RepositoryError::NotFound {
        uuid: uuid.to_string(),
      })
  }

  /// Store a new entity under a freshly generated identity.
  ///
  /// The DTO is expected to have passed [`Entity::assert_valid_dto`].
  pub async fn add(&self, dto: E::Dto) -> Result<E, RepositoryError> {
    let entity = E::create(dto);
    entity.save_to_db(&self.store).await?;
    tracing::info!(
      "Added entity to '{}': {}",
      E::db_key(),
      entity.uuid().unwrap_or_default()
    );
    Ok(entity)
  }

  /// Replace the record stored under `uuid`, creating it if absent.
  ///
  /// The stored record is rebuilt from `dto` with a fresh timestamp; no
  /// fields of the previous record are kept. A replaced record moves to the
  /// end of the collection.
  pub async fn put(&self, uuid: &str, dto: E::Dto) -> Result<E, RepositoryError> {
    let entity = E::from_object(uuid.to_string(), dto);
    let replaced = self
      .store
      .transaction(|doc| {
        let replaced = doc.remove(E::db_key(), uuid).is_some();
        entity.insert_into(doc)?;
        Ok::<_, RepositoryError>(replaced)
      })
      .await?;

    if replaced {
      tracing::info!("Replaced entity in '{}': {}", E::db_key(), uuid);
    } else {
      tracing::info!("Created entity in '{}' via put: {}", E::db_key(), uuid);
    }
    Ok(entity)
  }

  /// Delete the record stored under `uuid`, returning its last stored state.
  pub async fn remove(&self, uuid: &str) -> Result<E, RepositoryError> {
    let entity = self
      .store
      .transaction(|doc| {
        let raw = doc
          .find(E::db_key(), uuid)
          .cloned()
          .ok_or_else(|| RepositoryError::NotFound {
            uuid: uuid.to_string(),
          })?;
        let entity = E::from_raw(raw)?;
        entity.remove_from(doc)?;
        Ok::<_, RepositoryError>(entity)
      })
      .await?;

    tracing::info!("Removed entity from '{}': {}", E::db_key(), uuid);
    Ok(entity)
  }
}

impl<E: Entity> Clone for Repository<E> {
  fn clone(&self) -> Self {
    Self::new(self.store.clone())
  }
}
