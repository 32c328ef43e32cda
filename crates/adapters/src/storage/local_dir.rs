//! Copy images into a directory that a web server already exposes

use async_trait::async_trait;
use dreampost_domain::{ObjectStorage, StorageError};
use std::path::{Path, PathBuf};

use super::{file_name, public_url};

pub struct LocalDirStorage {
    dir: PathBuf,
    public_base_url: String,
}

impl LocalDirStorage {
    pub fn new(dir: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            public_base_url: public_base_url.into(),
        }
    }
}

#[async_trait]
impl ObjectStorage for LocalDirStorage {
    async fn upload(&self, path: &Path) -> Result<String, StorageError> {
        let name = file_name(path)?;

        tokio::fs::create_dir_all(&self.dir).await?;
        let target = self.dir.join(name);
        tokio::fs::copy(path, &target).await?;

        tracing::debug!(target = %target.display(), "Copied image into served directory");

        Ok(public_url(&self.public_base_url, name))
    }

    fn backend(&self) -> &'static str {
        "local_dir"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_copies_file_and_returns_url() {
        let source_dir = TempDir::new().unwrap();
        let served_dir = TempDir::new().unwrap();
        let source = source_dir.path().join("dream-abc.png");
        std::fs::write(&source, b"png-bytes").unwrap();

        let storage = LocalDirStorage::new(served_dir.path().join("media"), "https://me.example/media/");
        let url = storage.upload(&source).await.unwrap();

        assert_eq!(url, "https://me.example/media/dream-abc.png");
        let copied = std::fs::read(served_dir.path().join("media/dream-abc.png")).unwrap();
        assert_eq!(copied, b"png-bytes");
        // The source stays; its owner decides when to remove it
        assert!(source.exists());
    }

    #[tokio::test]
    async fn test_missing_source_is_io_error() {
        let served_dir = TempDir::new().unwrap();
        let storage = LocalDirStorage::new(served_dir.path(), "https://me.example");

        let result = storage.upload(Path::new("/nonexistent/dream.png")).await;

        assert!(matches!(result, Err(StorageError::Io(_))));
    }
}
