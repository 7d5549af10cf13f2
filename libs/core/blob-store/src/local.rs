use crate::{BlobStore, BlobStoreConfig, BlobStoreError, check_path};
use async_trait::async_trait;
use std::path::PathBuf;
use tracing::{error, info};

/// Writes blobs below a directory that the API serves statically.
#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
    base_url: String,
}

impl LocalBlobStore {
    pub fn new(config: BlobStoreConfig) -> Self {
        Self {
            root: config.root,
            base_url: config.base_url,
        }
    }

    pub fn root(&self) -> &PathBuf {
        &self.root
    }

    async fn write(&self, bytes: &[u8], path: &str) -> Result<String, BlobStoreError> {
        let relative = check_path(path)?;
        let target = self.root.join(relative);

        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&target, bytes).await?;

        Ok(format!("{}/{}", self.base_url, relative))
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    async fn upload(&self, bytes: Vec<u8>, path: &str, content_type: &str) -> Option<String> {
        match self.write(&bytes, path).await {
            Ok(url) => {
                info!(path, content_type, size = bytes.len(), "Blob stored");
                Some(url)
            }
            Err(e) => {
                error!(path, error = %e, "Blob upload failed");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_in(dir: &std::path::Path) -> LocalBlobStore {
        LocalBlobStore::new(BlobStoreConfig {
            root: dir.to_path_buf(),
            base_url: "http://localhost:8080/media".to_string(),
        })
    }

    #[tokio::test]
    async fn test_upload_writes_file_and_returns_url() {
        let dir = std::env::temp_dir().join(format!("blob-store-{}", uuid::Uuid::new_v4()));
        let store = store_in(&dir);

        let url = store
            .upload(b"png-bytes".to_vec(), "events/submitted/poster.png", "image/png")
            .await
            .unwrap();

        assert_eq!(url, "http://localhost:8080/media/events/submitted/poster.png");
        let written = tokio::fs::read(dir.join("events/submitted/poster.png")).await.unwrap();
        assert_eq!(written, b"png-bytes");

        tokio::fs::remove_dir_all(&dir).await.ok();
    }

    #[tokio::test]
    async fn test_upload_rejects_traversal() {
        let dir = std::env::temp_dir().join(format!("blob-store-{}", uuid::Uuid::new_v4()));
        let store = store_in(&dir);

        assert!(store.upload(vec![1], "../escape.png", "image/png").await.is_none());
    }
}
