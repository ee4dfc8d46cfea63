//! Whole-file text I/O

use std::path::{Path, PathBuf};
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;

use super::error::StoreError;

/// Read the whole file at `path` as UTF-8 and hand it to `parse`.
pub async fn read<T, F, E>(path: impl AsRef<Path>, parse: F) -> Result<T, StoreError>
where
  F: FnOnce(&str) -> Result<T, E>,
  E: std::error::Error + Send + Sync + 'static,
{
  let path = path.as_ref();
  let content = fs::read_to_string(path)
    .await
    .map_err(|source| StoreError::Read {
      path: path.to_path_buf(),
      source,
    })?;

  parse(&content).map_err(|e| StoreError::Parse {
    path: path.to_path_buf(),
    source: Box::new(e),
  })
}

/// Replace the entire content of the file at `path`.
///
/// Data goes to a sibling temp file first and is renamed over the target, so
/// a concurrent reader sees either the old or the new document.
pub async fn write(path: impl AsRef<Path>, data: impl AsRef<[u8]>) -> Result<(), StoreError> {
  let path = path.as_ref();
  let write_err = |source| StoreError::Write {
    path: path.to_path_buf(),
    source,
  };

  let temp_path = temp_path_for(path);
  let mut file = File::create(&temp_path).await.map_err(write_err)?;

  let result = async {
    file.write_all(data.as_ref()).await?;
    file.sync_all().await?;
    drop(file);
    fs::rename(&temp_path, path).await
  }
  .await;

  if let Err(e) = result {
    if let Err(cleanup) = fs::remove_file(&temp_path).await {
      tracing::warn!("Failed to remove {}: {}", temp_path.display(), cleanup);
    }
    return Err(write_err(e));
  }
  Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
  let mut name = path.file_name().unwrap_or_default().to_os_string();
  name.push(".tmp");
  path.with_file_name(name)
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::TempDir;

  #[tokio::test]
  async fn test_write_then_read() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("doc.json");

    write(&path, r#"{"logs":[]}"#).await.unwrap();
    let value: serde_json::Value = read(&path, |s| serde_json::from_str(s)).await.unwrap();
    assert_eq!(value, serde_json::json!({"logs": []}));
    assert!(!dir.path().join("doc.json.tmp").exists());
  }

  #[tokio::test]
  async fn test_write_overwrites_whole_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("doc.json");

    write(&path, "a much longer first version").await.unwrap();
    write(&path, "short").await.unwrap();
    let content: String = read(&path, |s| Ok::<_, std::convert::Infallible>(s.to_string()))
      .await
      .unwrap();
    assert_eq!(content, "short");
  }

  #[tokio::test]
  async fn test_failed_write_removes_temp_file() {
    let dir = TempDir::new().unwrap();
    // Renaming a file over a non-empty directory fails
    let path = dir.path().join("occupied");
    std::fs::create_dir(&path).unwrap();
    std::fs::write(path.join("inner"), "x").unwrap();

    let err = write(&path, "data").await.unwrap_err();
    assert!(matches!(err, StoreError::Write { .. }));
    assert!(!dir.path().join("occupied.tmp").exists());
  }

  #[tokio::test]
  async fn test_read_missing_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("missing.json");

    let err = read(&path, |s| serde_json::from_str::<serde_json::Value>(s))
      .await
      .unwrap_err();
    assert!(matches!(err, StoreError::Read { .. }));
    assert!(err.to_string().contains("missing.json"));
  }

  #[tokio::test]
  async fn test_read_malformed_content() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.json");
    tokio::fs::write(&path, "{ not json").await.unwrap();

    let err = read(&path, |s| serde_json::from_str::<serde_json::Value>(s))
      .await
      .unwrap_err();
    assert!(matches!(err, StoreError::Parse { .. }));
  }

  #[tokio::test]
  async fn test_read_rejects_invalid_utf8() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("latin1.json");
    tokio::fs::write(&path, [0x22, 0xe9, 0x22]).await.unwrap();

    let err = read(&path, |s| serde_json::from_str::<serde_json::Value>(s))
      .await
      .unwrap_err();
    assert!(matches!(err, StoreError::Read { .. }));
  }
}
