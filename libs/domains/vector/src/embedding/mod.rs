mod openai;
mod provider;
mod fixed;

pub use fixed::StaticEmbeddingProvider;
pub use openai::OpenAIProvider;
pub use provider::EmbeddingProvider;

#[cfg(test)]
pub use provider::MockEmbeddingProvider;
