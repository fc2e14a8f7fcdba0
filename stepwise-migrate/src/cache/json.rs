//! Cache stored as a single JSON document.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::debug;

use super::{Cache, CacheEntries};
use crate::error::{MigrateResult, MigrationError};
use crate::status::Status;

/// On-disk document layout.
#[derive(Debug, Default, Serialize, Deserialize)]
struct CacheDocument {
    #[serde(default)]
    entries: CacheEntries,
}

/// File-backed cache.
///
/// Every mutation rewrites the whole document through a temporary sibling
/// file that is synced and then renamed over the target, so an entry is
/// durable once `add`/`remove` returns and a crash never leaves a torn file.
#[derive(Debug)]
pub struct JsonFileCache {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileCache {
    /// Create a cache backed by the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> MigrateResult<CacheDocument> {
        let content = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            MigrationError::cache(format!(
                "Failed to read cache file {}: {}",
                self.path.display(),
                e
            ))
        })?;

        serde_json::from_str(&content).map_err(|e| {
            MigrationError::cache(format!(
                "Failed to parse cache file {}: {}",
                self.path.display(),
                e
            ))
        })
    }

    async fn store(&self, document: &CacheDocument) -> MigrateResult<()> {
        let content = serde_json::to_string_pretty(document).map_err(|e| {
            MigrationError::cache(format!("Failed to serialize cache: {}", e))
        })?;

        let tmp_path = self.tmp_path();
        let mut file = tokio::fs::File::create(&tmp_path).await?;
        file.write_all(content.as_bytes()).await?;
        file.write_all(b"\n").await?;
        file.sync_all().await?;
        drop(file);

        tokio::fs::rename(&tmp_path, &self.path).await?;
        Ok(())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait::async_trait]
impl Cache for JsonFileCache {
    async fn exists(&self) -> MigrateResult<bool> {
        Ok(tokio::fs::try_exists(&self.path).await?)
    }

    async fn create(&self) -> MigrateResult<()> {
        let _guard = self.write_lock.lock().await;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        debug!(path = %self.path.display(), "Creating cache file");
        self.store(&CacheDocument::default()).await
    }

    async fn read(&self) -> MigrateResult<CacheEntries> {
        Ok(self.load().await?.entries)
    }

    async fn add(&self, id: &str, status: Status) -> MigrateResult<()> {
        let _guard = self.write_lock.lock().await;

        let mut document = self.load().await?;
        document.entries.insert(id.to_string(), status);
        debug!(id, %status, "Recording script status");
        self.store(&document).await
    }

    async fn remove(&self, id: &str) -> MigrateResult<()> {
        let _guard = self.write_lock.lock().await;

        let mut document = self.load().await?;
        if document.entries.remove(id).is_none() {
            return Ok(());
        }
        debug!(id, "Removing script status");
        self.store(&document).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_then_read_empty() {
        let dir = tempfile::tempdir().unwrap();
        let cache = JsonFileCache::new(dir.path().join("nested/cache.json"));

        assert!(!cache.exists().await.unwrap());
        cache.create().await.unwrap();
        assert!(cache.exists().await.unwrap());
        assert!(cache.read().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_entries_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");

        let cache = JsonFileCache::new(&path);
        cache.create().await.unwrap();
        cache.add("Version1", Status::Passed).await.unwrap();
        cache.add("Version2", Status::Failed).await.unwrap();
        cache.remove("Version3").await.unwrap();
        drop(cache);

        let reopened = JsonFileCache::new(&path);
        let entries = reopened.read().await.unwrap();
        assert_eq!(entries.get("Version1"), Some(&Status::Passed));
        assert_eq!(entries.get("Version2"), Some(&Status::Failed));
        assert_eq!(entries.len(), 2);

        reopened.remove("Version1").await.unwrap();
        assert!(!reopened.read().await.unwrap().contains_key("Version1"));
        assert!(!dir.path().join("cache.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_document_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");

        let cache = JsonFileCache::new(&path);
        cache.create().await.unwrap();
        cache.add("Version1", Status::Passed).await.unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["entries"]["Version1"], "PASSED");
    }

    #[tokio::test]
    async fn test_read_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let cache = JsonFileCache::new(dir.path().join("absent.json"));
        let err = cache.read().await.unwrap_err();
        assert!(matches!(err, MigrationError::Cache(_)));
    }

    #[tokio::test]
    async fn test_read_malformed_file_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = JsonFileCache::new(&path).read().await.unwrap_err();
        assert!(err.to_string().contains("cache.json"));
    }
}
