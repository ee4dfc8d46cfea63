use std::path::PathBuf;
use thiserror::Error;

/// Datastore I/O and encoding errors
#[derive(Debug, Error)]
pub enum StoreError {
  #[error("failed to read {}: {source}", .path.display())]
  Read {
    path: PathBuf,
    source: std::io::Error,
  },

  #[error("failed to parse {}: {source}", .path.display())]
  Parse {
    path: PathBuf,
    source: Box<dyn std::error::Error + Send + Sync>,
  },

  #[error("failed to write {}: {source}", .path.display())]
  Write {
    path: PathBuf,
    source: std::io::Error,
  },

  #[error("failed to serialize document for {}: {source}", .path.display())]
  Serialize {
    path: PathBuf,
    source: serde_json::Error,
  },
}
