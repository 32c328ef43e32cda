//! JSON file holding the single pending post

use async_trait::async_trait;
use dreampost_domain::{PendingContent, StagingError, StagingStore};
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// File-backed staging slot
#[derive(Debug, Clone)]
pub struct FsStagingStore {
    path: PathBuf,
}

impl FsStagingStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl StagingStore for FsStagingStore {
    async fn put(&self, record: &PendingContent) -> Result<(), StagingError> {
        let json = serde_json::to_vec_pretty(record)
            .map_err(|e| StagingError::Serialization(e.to_string()))?;

        write_atomically(&self.path, &json).await?;

        tracing::debug!(path = %self.path.display(), "Staged record written");
        Ok(())
    }

    async fn get(&self) -> Result<Option<PendingContent>, StagingError> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let record: PendingContent = serde_json::from_slice(&bytes).map_err(|e| {
            StagingError::Corrupt(format!("{}: {}", self.path.display(), e))
        })?;

        record
            .validate()
            .map_err(|e| StagingError::Corrupt(format!("{}: {}", self.path.display(), e)))?;

        Ok(Some(record))
    }
}

/// Replace `path` with `contents` so readers see either the old or the new file
///
/// Writes to a hidden sibling, syncs it, then renames over the target.
pub(crate) async fn write_atomically(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).await?;
            parent.to_path_buf()
        }
        _ => PathBuf::from("."),
    };

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "staged".to_string());
    let tmp = parent.join(format!(".{}.{}.tmp", name, Uuid::new_v4().simple()));

    let result = async {
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&tmp)
            .await?;
        file.write_all(contents).await?;
        file.sync_all().await?;
        drop(file);
        fs::rename(&tmp, path).await
    }
    .await;

    if result.is_err() {
        let _ = fs::remove_file(&tmp).await;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use dreampost_domain::MediaReference;
    use tempfile::TempDir;

    fn record(caption: &str) -> PendingContent {
        PendingContent::new(
            MediaReference::Url("https://cdn.example/img123.png".to_string()),
            caption,
            "#dreamy #calm #art #night #peace",
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_get_missing_file_is_none() {
        let dir = TempDir::new().unwrap();
        let store = FsStagingStore::new(dir.path().join("pending_post.json"));

        assert_eq!(store.get().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_put_then_get_roundtrip() {
        let dir = TempDir::new().unwrap();
        let store = FsStagingStore::new(dir.path().join("pending_post.json"));

        store.put(&record("Rest easy tonight")).await.unwrap();

        assert_eq!(store.get().await.unwrap(), Some(record("Rest easy tonight")));
    }

    #[tokio::test]
    async fn test_second_put_replaces_and_leaves_no_temp_files() {
        let dir = TempDir::new().unwrap();
        let store = FsStagingStore::new(dir.path().join("pending_post.json"));

        store.put(&record("first")).await.unwrap();
        store.put(&record("second")).await.unwrap();

        assert_eq!(store.get().await.unwrap(), Some(record("second")));

        let entries: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(entries, vec!["pending_post.json".to_string()]);
    }

    #[tokio::test]
    async fn test_put_creates_parent_directory() {
        let dir = TempDir::new().unwrap();
        let store = FsStagingStore::new(dir.path().join("state/pending_post.json"));

        store.put(&record("nested")).await.unwrap();

        assert!(dir.path().join("state/pending_post.json").exists());
    }

    #[tokio::test]
    async fn test_file_format_is_flat_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pending_post.json");
        let store = FsStagingStore::new(&path);

        store.put(&record("Rest easy tonight")).await.unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["media_reference"], "https://cdn.example/img123.png");
        assert_eq!(value["caption"], "Rest easy tonight");
    }

    #[tokio::test]
    async fn test_garbage_file_is_corrupt() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pending_post.json");
        std::fs::write(&path, "{not json").unwrap();

        let result = FsStagingStore::new(&path).get().await;

        assert!(matches!(result, Err(StagingError::Corrupt(_))));
    }

    #[tokio::test]
    async fn test_missing_field_is_corrupt() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("pending_post.json");
        std::fs::write(
            &path,
            r##"{"media_reference": "https://cdn.example/a.png", "caption": "", "hashtags": "#a"}"##,
        )
        .unwrap();

        let result = FsStagingStore::new(&path).get().await;

        assert!(matches!(result, Err(StagingError::Corrupt(_))));
    }
}
