use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

use crate::embedding::EmbeddingProvider;
use crate::error::{VectorError, VectorResult};
use crate::models::EmbeddingModel;

/// Embeds text with a bounded wait and a dimension check.
#[derive(Clone)]
pub struct EmbeddingService {
    provider: Arc<dyn EmbeddingProvider>,
    model: EmbeddingModel,
    timeout: Duration,
}

impl EmbeddingService {
    pub fn new(provider: Arc<dyn EmbeddingProvider>, model: EmbeddingModel, timeout: Duration) -> Self {
        Self {
            provider,
            model,
            timeout,
        }
    }

    pub fn model(&self) -> EmbeddingModel {
        self.model
    }

    /// Embedding for `text`; blank input is rejected before calling the provider.
    #[instrument(skip(self, text), fields(model = self.model.model_name(), chars = text.len()))]
    pub async fn embed_text(&self, text: &str) -> VectorResult<Vec<f32>> {
        let text = text.trim();
        if text.is_empty() {
            return Err(VectorError::Validation("Text to embed must not be empty".to_string()));
        }

        let result = tokio::time::timeout(self.timeout, self.provider.embed(self.model, text))
            .await
            .map_err(|_| {
                tracing::warn!(timeout_secs = self.timeout.as_secs(), "Embedding request timed out");
                VectorError::Timeout(self.timeout.as_secs())
            })??;

        let expected = self.model.dimension() as usize;
        if result.values.len() != expected {
            return Err(VectorError::DimensionMismatch {
                expected,
                actual: result.values.len(),
            });
        }

        tracing::debug!(tokens = result.tokens_used, "Embedding generated");
        Ok(result.values)
    }
}
