use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Embedding provider types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
pub enum EmbeddingProviderType {
    #[default]
    OpenAI,
    Local,
}

/// Embedding model selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
pub enum EmbeddingModel {
    /// OpenAI text-embedding-3-small (1536 dimensions)
    #[default]
    TextEmbedding3Small,
    /// OpenAI text-embedding-3-large (3072 dimensions)
    TextEmbedding3Large,
    /// OpenAI text-embedding-ada-002 (1536 dimensions, legacy)
    TextEmbeddingAda002,
    /// Custom dimension (local models, tests)
    Custom(u32),
}

impl EmbeddingModel {
    pub fn dimension(&self) -> u32 {
        match self {
            EmbeddingModel::TextEmbedding3Small => 1536,
            EmbeddingModel::TextEmbedding3Large => 3072,
            EmbeddingModel::TextEmbeddingAda002 => 1536,
            EmbeddingModel::Custom(dim) => *dim,
        }
    }

    pub fn model_name(&self) -> &str {
        match self {
            EmbeddingModel::TextEmbedding3Small => "text-embedding-3-small",
            EmbeddingModel::TextEmbedding3Large => "text-embedding-3-large",
            EmbeddingModel::TextEmbeddingAda002 => "text-embedding-ada-002",
            EmbeddingModel::Custom(_) => "custom",
        }
    }

    pub fn provider(&self) -> EmbeddingProviderType {
        match self {
            EmbeddingModel::Custom(_) => EmbeddingProviderType::Local,
            _ => EmbeddingProviderType::OpenAI,
        }
    }
}

/// Embedding generation result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingResult {
    pub values: Vec<f32>,
    pub dimension: u32,
    pub tokens_used: u32,
}

/// Ranking parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimilarityQuery {
    /// Minimum cosine similarity, inclusive
    pub threshold: f32,
    /// Maximum number of matches; `None` keeps every match
    pub limit: Option<usize>,
    /// Candidates dated before this day are skipped
    pub min_date: Option<NaiveDate>,
}

impl SimilarityQuery {
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold,
            limit: None,
            min_date: None,
        }
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_min_date(mut self, min_date: NaiveDate) -> Self {
        self.min_date = Some(min_date);
        self
    }
}

/// A ranked candidate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ScoredMatch {
    pub id: Uuid,
    pub score: f32,
}
