use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::EmbeddingProvider;
use crate::config::OpenAIConfig;
use crate::error::{VectorError, VectorResult};
use crate::models::{EmbeddingModel, EmbeddingProviderType, EmbeddingResult};

/// OpenAI embeddings provider
pub struct OpenAIProvider {
    client: Client,
    config: OpenAIConfig,
}

impl OpenAIProvider {
    pub fn new(config: OpenAIConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    dimensions: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
    usage: EmbeddingUsage,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingUsage {
    total_tokens: u32,
}

#[async_trait]
impl EmbeddingProvider for OpenAIProvider {
    fn provider_type(&self) -> EmbeddingProviderType {
        EmbeddingProviderType::OpenAI
    }

    async fn embed(&self, model: EmbeddingModel, text: &str) -> VectorResult<EmbeddingResult> {
        let dimensions = match model {
            EmbeddingModel::Custom(dim) => Some(dim),
            _ => None,
        };

        let request = EmbeddingRequest {
            model: model.model_name(),
            input: text,
            dimensions,
        };

        let response = self
            .client
            .post(format!("{}/embeddings", self.config.base_url))
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(VectorError::Embedding(format!(
                "OpenAI API error ({}): {}",
                status, error_text
            )));
        }

        let body: EmbeddingResponse = response.json().await?;
        let tokens_used = body.usage.total_tokens;

        body.data
            .into_iter()
            .next()
            .map(|d| EmbeddingResult {
                dimension: d.embedding.len() as u32,
                values: d.embedding,
                tokens_used,
            })
            .ok_or_else(|| VectorError::Embedding("No embedding returned".to_string()))
    }
}
