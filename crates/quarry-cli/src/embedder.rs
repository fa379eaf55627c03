//! Embedding backend selection.
//!
//! The index is generic over its embedding provider; the CLI picks one at
//! runtime from configuration (or the `--offline` flag) and erases the
//! difference behind this enum.

use crate::config::Config;
use quarry_domain::traits::EmbeddingProvider;
use quarry_llm::OllamaEmbedder;
use quarry_store::HashEmbedder;

/// The embedding backends the CLI can drive.
pub enum AnyEmbedder {
    /// Ollama's embedding API
    Ollama(OllamaEmbedder),
    /// Deterministic hash embedder (offline / testing)
    Hash(HashEmbedder),
}

impl AnyEmbedder {
    /// Pick a backend from configuration.
    pub fn from_config(config: &Config, offline: bool) -> Self {
        if offline {
            Self::Hash(HashEmbedder::new(config.ollama.embedding_dimension))
        } else {
            Self::Ollama(OllamaEmbedder::new(
                &config.ollama.endpoint,
                &config.ollama.embedding_model,
                config.ollama.embedding_dimension,
            ))
        }
    }
}

impl EmbeddingProvider for AnyEmbedder {
    type Error = anyhow::Error;

    fn embed(&self, text: &str) -> std::result::Result<Vec<f32>, Self::Error> {
        match self {
            // Fully qualified: OllamaEmbedder also has an inherent async embed
            Self::Ollama(e) => EmbeddingProvider::embed(e, text).map_err(Into::into),
            Self::Hash(e) => e.embed(text).map_err(Into::into),
        }
    }

    fn dimension(&self) -> usize {
        match self {
            Self::Ollama(e) => e.dimension(),
            Self::Hash(e) => e.dimension(),
        }
    }
}
