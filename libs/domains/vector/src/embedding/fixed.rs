use async_trait::async_trait;
use std::collections::HashMap;

use super::EmbeddingProvider;
use crate::error::{VectorError, VectorResult};
use crate::models::{EmbeddingModel, EmbeddingProviderType, EmbeddingResult};

/// Deterministic provider for development and tests.
///
/// Returns the registered vector for an exact text, otherwise the fallback
/// vector; with no fallback, unknown texts fail as an upstream error.
#[derive(Debug, Clone, Default)]
pub struct StaticEmbeddingProvider {
    vectors: HashMap<String, Vec<f32>>,
    fallback: Option<Vec<f32>>,
}

impl StaticEmbeddingProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(mut self, text: impl Into<String>, vector: Vec<f32>) -> Self {
        self.vectors.insert(text.into(), vector);
        self
    }

    pub fn with_fallback(mut self, vector: Vec<f32>) -> Self {
        self.fallback = Some(vector);
        self
    }
}

#[async_trait]
impl EmbeddingProvider for StaticEmbeddingProvider {
    fn provider_type(&self) -> EmbeddingProviderType {
        EmbeddingProviderType::Local
    }

    async fn embed(&self, _model: EmbeddingModel, text: &str) -> VectorResult<EmbeddingResult> {
        let values = self
            .vectors
            .get(text)
            .or(self.fallback.as_ref())
            .cloned()
            .ok_or_else(|| VectorError::Embedding(format!("no vector registered for '{}'", text)))?;

        Ok(EmbeddingResult {
            dimension: values.len() as u32,
            values,
            tokens_used: 0,
        })
    }
}
