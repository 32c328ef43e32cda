//! Object storage adapters that turn a local image into a public URL

mod local_dir;
mod s3;

pub use local_dir::LocalDirStorage;
pub use s3::{S3Config, S3Credentials, S3Storage};

use dreampost_domain::StorageError;
use std::path::Path;

/// File name of `path`, rejecting paths without one
fn file_name(path: &Path) -> Result<&str, StorageError> {
    path.file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty())
        .ok_or_else(|| StorageError::Config(format!("'{}' has no file name", path.display())))
}

/// Join a base URL and a relative key with exactly one slash
fn public_url(base: &str, key: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        key.trim_start_matches('/')
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_url_normalizes_slashes() {
        assert_eq!(
            public_url("https://cdn.example/", "/daily/img.png"),
            "https://cdn.example/daily/img.png"
        );
        assert_eq!(
            public_url("https://cdn.example", "img.png"),
            "https://cdn.example/img.png"
        );
    }

    #[test]
    fn test_file_name_required() {
        assert_eq!(file_name(Path::new("/tmp/x/dream.png")).unwrap(), "dream.png");
        assert!(file_name(Path::new("/")).is_err());
    }
}
