//! JSON document persisted as one flat file
//!
//! Every operation loads and rewrites the whole document. Mutations go
//! through [`Datastore::transaction`], which serializes writers on the same
//! path within this process.

mod error;
pub mod file;

pub use error::StoreError;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock, Weak};

type PathLock = tokio::sync::Mutex<()>;

/// Path -> writer lock, shared by every handle opened on the same file
static PATH_LOCKS: OnceLock<Mutex<HashMap<PathBuf, Weak<PathLock>>>> = OnceLock::new();

/// Canonical form of `path`. The file may not exist yet, so only its parent
/// directory is resolved.
fn lock_key(path: &Path) -> PathBuf {
  let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
  if let Ok(canonical) = std::fs::canonicalize(&absolute) {
    return canonical;
  }
  match (absolute.parent(), absolute.file_name()) {
    (Some(parent), Some(name)) => std::fs::canonicalize(parent)
      .map(|dir| dir.join(name))
      .unwrap_or(absolute),
    _ => absolute,
  }
}

fn lock_for(path: &Path) -> Arc<PathLock> {
  let key = lock_key(path);
  let mut locks = PATH_LOCKS.get_or_init(|| Mutex::new(HashMap::new())).lock();

  if let Some(lock) = locks.get(&key).and_then(Weak::upgrade) {
    return lock;
  }

  locks.retain(|_, lock| lock.strong_count() > 0);
  let lock = Arc::new(PathLock::new(()));
  locks.insert(key, Arc::downgrade(&lock));
  lock
}

/// Identity of a raw record, if it carries a string `uuid`
pub fn record_uuid(record: &Value) -> Option<&str> {
  record.get("uuid").and_then(Value::as_str)
}

/// In-memory form of the whole database: collection name -> raw records
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document {
  collections: BTreeMap<String, Vec<Value>>,
}

impl Document {
  /// Document holding the given collections, all empty
  pub fn with_collections<'a>(keys: impl IntoIterator<Item = &'a str>) -> Self {
    Self {
      collections: keys
        .into_iter()
        .map(|key| (key.to_string(), Vec::new()))
        .collect(),
    }
  }

  /// Records of a collection in stored order (empty if absent)
  pub fn collection(&self, key: &str) -> &[Value] {
    self.collections.get(key).map(Vec::as_slice).unwrap_or(&[])
  }

  /// Take ownership of one collection's records, dropping the rest
  pub fn into_collection(mut self, key: &str) -> Vec<Value> {
    self.collections.remove(key).unwrap_or_default()
  }

  pub fn collection_mut(&mut self, key: &str) -> &mut Vec<Value> {
    self.collections.entry(key.to_string()).or_default()
  }

  pub fn find(&self, key: &str, uuid: &str) -> Option<&Value> {
    self
      .collection(key)
      .iter()
      .find(|record| record_uuid(record) == Some(uuid))
  }

  pub fn contains(&self, key: &str, uuid: &str) -> bool {
    self.find(key, uuid).is_some()
  }

  pub fn push(&mut self, key: &str, record: Value) {
    self.collection_mut(key).push(record);
  }

  /// Remove the record with `uuid`, returning it if it was present
  pub fn remove(&mut self, key: &str, uuid: &str) -> Option<Value> {
    let records = self.collections.get_mut(key)?;
    let index = records
      .iter()
      .position(|record| record_uuid(record) == Some(uuid))?;
    Some(records.remove(index))
  }
}

/// Handle to the JSON document at one path
#[derive(Debug, Clone)]
pub struct Datastore {
  path: PathBuf,
  lock: Arc<PathLock>,
}

impl Datastore {
  pub fn new(path: impl AsRef<Path>) -> Self {
    let path = path.as_ref().to_path_buf();
    let lock = lock_for(&path);
    Self { path, lock }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  /// Create the document with empty `collections` if the file does not exist.
  /// Returns whether a new file was written.
  pub async fn init<'a>(
    &self,
    collections: impl IntoIterator<Item = &'a str>,
  ) -> Result<bool, StoreError> {
    let _guard = self.lock.lock().await;

    if tokio::fs::try_exists(&self.path).await.unwrap_or(false) {
      return Ok(false);
    }

    if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
      tokio::fs::create_dir_all(parent)
        .await
        .map_err(|source| StoreError::Write {
          path: self.path.clone(),
          source,
        })?;
    }

    self.save(&Document::with_collections(collections)).await?;
    tracing::info!("Created datastore at {}", self.path.display());
    Ok(true)
  }

  pub async fn load(&self) -> Result<Document, StoreError> {
    tracing::debug!("Loading datastore {}", self.path.display());
    file::read(&self.path, |content| serde_json::from_str(content)).await
  }

  pub async fn save(&self, document: &Document) -> Result<(), StoreError> {
    let json = serde_json::to_vec_pretty(document).map_err(|source| StoreError::Serialize {
      path: self.path.clone(),
      source,
    })?;
    file::write(&self.path, json).await
  }

  /// Load, mutate and persist the document as one unit.
  ///
  /// Holds the path lock for the whole sequence. Nothing is written when `f`
  /// fails.
  pub async fn transaction<T, E, F>(&self, f: F) -> Result<T, E>
  where
    F: FnOnce(&mut Document) -> Result<T, E>,
    E: From<StoreError>,
  {
    let _guard = self.lock.lock().await;
    let mut document = self.load().await?;
    let output = f(&mut document)?;
    self.save(&document).await?;
    Ok(output)
  }
}
