//! Scoped local image files

use std::io;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// A freshly written image file that is removed when dropped unless kept
#[derive(Debug)]
pub struct ScratchImage {
    path: PathBuf,
    keep: bool,
}

impl ScratchImage {
    /// Write `bytes` to a uniquely named file in `dir`
    pub async fn write(dir: &Path, extension: &str, bytes: &[u8]) -> io::Result<Self> {
        if !dir.as_os_str().is_empty() {
            tokio::fs::create_dir_all(dir).await?;
        }

        let extension = extension.trim_start_matches('.');
        let path = dir.join(format!("dream-{}.{}", Uuid::new_v4().simple(), extension));
        tokio::fs::write(&path, bytes).await?;

        tracing::debug!(path = %path.display(), bytes = bytes.len(), "Wrote image file");

        Ok(Self { path, keep: false })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Disarm the cleanup and hand back the path
    pub fn keep(mut self) -> PathBuf {
        self.keep = true;
        std::mem::take(&mut self.path)
    }
}

impl Drop for ScratchImage {
    fn drop(&mut self) {
        if self.keep {
            return;
        }

        match std::fs::remove_file(&self.path) {
            Ok(()) => tracing::debug!(path = %self.path.display(), "Removed local image"),
            Err(error) if error.kind() == io::ErrorKind::NotFound => {}
            Err(error) => tracing::warn!(
                path = %self.path.display(),
                error = %error,
                "Failed to remove local image"
            ),
        }
    }
}
