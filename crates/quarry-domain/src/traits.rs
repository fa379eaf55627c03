//! Trait definitions for external capabilities
//!
//! These traits define the boundaries between domain logic and infrastructure.
//! Infrastructure implementations live in other crates.

/// Trait for text embedding backends
///
/// Implemented by the infrastructure layer (quarry-llm for Ollama,
/// quarry-store for the deterministic hash fallback). Implementations must be
/// deterministic: identical input text yields an identical vector.
pub trait EmbeddingProvider {
    /// Error type for embedding operations
    type Error;

    /// Embed text into a fixed-length vector
    fn embed(&self, text: &str) -> Result<Vec<f32>, Self::Error>;

    /// Dimension of every vector this provider produces
    fn dimension(&self) -> usize;
}

/// Trait for text generation backends
///
/// Implemented by the infrastructure layer (quarry-llm). Implementations are
/// expected to run in a deterministic / zero-temperature mode, since
/// repeatable extraction is a correctness goal.
pub trait GenerationProvider {
    /// Error type for generation operations
    type Error;

    /// Generate a completion for the prompt
    fn generate(&self, prompt: &str) -> Result<String, Self::Error>;
}

/// Trait for recognizing which known entity a document is about
///
/// Supplied by configuration rather than hardcoded: a gazetteer, a regex set,
/// or a classifier can all sit behind this seam. `scan` receives the leading
/// portion of a document and returns the matched entity name, or `None` when
/// the document should keep the "unknown" tag.
pub trait EntityMatcher {
    /// Return the entity the text is about, if one is recognized
    fn scan(&self, text: &str) -> Option<String>;
}
