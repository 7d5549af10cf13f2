//! Blob storage for uploaded media.
//!
//! [`BlobStore::upload`] reports failure as `None` so callers can abort their
//! own flow without handling storage-specific errors.

mod config;
mod local;
mod memory;

pub use config::BlobStoreConfig;
pub use local::LocalBlobStore;
pub use memory::InMemoryBlobStore;

use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum BlobStoreError {
    #[error("Invalid blob path: {0}")]
    InvalidPath(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `bytes` under `path`, returning the public URL on success.
    async fn upload(&self, bytes: Vec<u8>, path: &str, content_type: &str) -> Option<String>;
}

/// Rejects absolute paths and parent traversal.
pub(crate) fn check_path(path: &str) -> Result<&str, BlobStoreError> {
    let trimmed = path.trim_start_matches('/');
    if trimmed.is_empty()
        || path.starts_with('/')
        || trimmed.split('/').any(|segment| segment == ".." || segment.is_empty())
    {
        return Err(BlobStoreError::InvalidPath(path.to_string()));
    }
    Ok(trimmed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_path() {
        assert_eq!(check_path("events/submitted/a.png").unwrap(), "events/submitted/a.png");
        assert!(check_path("../etc/passwd").is_err());
        assert!(check_path("/abs/file.png").is_err());
        assert!(check_path("events//a.png").is_err());
        assert!(check_path("").is_err());
    }
}
