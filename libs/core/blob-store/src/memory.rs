use crate::{BlobStore, check_path};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Keeps blobs in memory; `failing()` builds a store whose uploads always fail.
#[derive(Debug, Default, Clone)]
pub struct InMemoryBlobStore {
    blobs: Arc<RwLock<HashMap<String, (Vec<u8>, String)>>>,
    fail: bool,
}

impl InMemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub async fn get(&self, path: &str) -> Option<Vec<u8>> {
        self.blobs.read().await.get(path).map(|(bytes, _)| bytes.clone())
    }

    pub async fn len(&self) -> usize {
        self.blobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.blobs.read().await.is_empty()
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn upload(&self, bytes: Vec<u8>, path: &str, content_type: &str) -> Option<String> {
        if self.fail {
            tracing::warn!(path, "Simulated blob upload failure");
            return None;
        }

        let path = check_path(path).ok()?;
        self.blobs
            .write()
            .await
            .insert(path.to_string(), (bytes, content_type.to_string()));

        Some(format!("memory://{}", path))
    }
}
