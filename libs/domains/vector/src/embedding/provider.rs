use async_trait::async_trait;

use crate::error::VectorResult;
use crate::models::{EmbeddingModel, EmbeddingProviderType, EmbeddingResult};

/// Trait for embedding generation providers
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Get the provider type
    fn provider_type(&self) -> EmbeddingProviderType;

    /// Generate embedding for a single text
    async fn embed(&self, model: EmbeddingModel, text: &str) -> VectorResult<EmbeddingResult>;
}
