//! Vector Domain Library
//!
//! Text embeddings and in-process similarity ranking.
//!
//! ```text
//! ┌──────────────────┐      ┌───────────────────┐
//! │ EmbeddingService │─────►│ EmbeddingProvider │  (OpenAI-compatible API)
//! └────────┬─────────┘      └───────────────────┘
//!          │ query vector
//! ┌────────▼─────────┐
//! │      rank()      │  cosine similarity, threshold, min date, limit, deterministic order
//! └──────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_vector::{EmbeddingModel, EmbeddingService, OpenAIConfig, OpenAIProvider, SimilarityQuery, rank};
//! use std::{sync::Arc, time::Duration};
//!
//! # async fn example(candidates: Vec<(uuid::Uuid, chrono::NaiveDate, Vec<f32>)>) -> Result<(), Box<dyn std::error::Error>> {
//! let provider = Arc::new(OpenAIProvider::new(OpenAIConfig::new("sk-...".to_string())));
//! let service = EmbeddingService::new(provider, EmbeddingModel::TextEmbedding3Small, Duration::from_secs(10));
//!
//! let query = service.embed_text("hackathon this weekend").await?;
//! let matches = rank(
//!     &query,
//!     candidates.iter().map(|(id, date, v)| (*id, *date, v.as_slice())),
//!     &SimilarityQuery::new(0.25),
//! );
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod embedding;
pub mod error;
pub mod models;
pub mod service;
pub mod similarity;

// Re-export commonly used types
pub use config::{OpenAIConfig, SearchConfig};
pub use embedding::{EmbeddingProvider, OpenAIProvider, StaticEmbeddingProvider};
pub use error::{VectorError, VectorResult};
pub use models::{
    EmbeddingModel, EmbeddingProviderType, EmbeddingResult, ScoredMatch, SimilarityQuery,
};
pub use service::EmbeddingService;
pub use similarity::{cosine_similarity, rank};
