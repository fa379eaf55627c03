//! Deterministic fallback embedding model
//!
//! The real embedding capability is an external backend (see quarry-llm).
//! `HashEmbedder` stands in for it in tests and offline runs: it derives a
//! pseudo-random but fully deterministic unit vector from the text via seeded
//! hashing. It carries no semantic signal, only the properties the pipeline
//! contract needs - determinism, fixed dimension, unit length.

use quarry_domain::traits::EmbeddingProvider;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use thiserror::Error;

/// Errors that can occur during embedding generation
#[derive(Error, Debug)]
pub enum EmbeddingError {
    /// Input text cannot be embedded
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Hash-based deterministic embedder
///
/// - **Deterministic**: same text always produces the same vector
/// - **Normalized**: unit length, so cosine similarity is well-behaved
/// - **Diverse**: different texts land in different directions
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dimension: usize,
}

impl HashEmbedder {
    /// Create an embedder producing vectors of the given dimension
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    fn component(text: &str, seed: u64) -> f32 {
        let mut hasher = DefaultHasher::new();
        text.hash(&mut hasher);
        seed.hash(&mut hasher);
        let hash_value = hasher.finish();

        // Map the hash into [-1, 1]
        ((hash_value as f64 / u64::MAX as f64) * 2.0 - 1.0) as f32
    }
}

impl EmbeddingProvider for HashEmbedder {
    type Error = EmbeddingError;

    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        if text.trim().is_empty() {
            return Err(EmbeddingError::InvalidInput(
                "Empty text cannot be embedded".to_string(),
            ));
        }

        let mut embedding: Vec<f32> = (0..self.dimension)
            .map(|i| Self::component(text, i as u64))
            .collect();

        let magnitude: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if magnitude > 0.0 {
            for value in &mut embedding {
                *value /= magnitude;
            }
        }

        Ok(embedding)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Cosine similarity between two vectors of equal length
///
/// Returns a value in [-1, 1]; zero-magnitude inputs score 0.0.
///
/// # Panics
///
/// Panics if the vectors have different lengths.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    assert_eq!(a.len(), b.len(), "Vectors must have same length");

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let mag_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let mag_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if mag_a == 0.0 || mag_b == 0.0 {
        return 0.0;
    }

    dot / (mag_a * mag_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic() {
        let embedder = HashEmbedder::new(64);
        let a = embedder.embed("quarterly report").unwrap();
        let b = embedder.embed("quarterly report").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_dimension() {
        let embedder = HashEmbedder::new(32);
        assert_eq!(embedder.dimension(), 32);
        assert_eq!(embedder.embed("text").unwrap().len(), 32);
    }

    #[test]
    fn test_unit_length() {
        let embedder = HashEmbedder::new(64);
        let v = embedder.embed("some text").unwrap();
        let magnitude: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((magnitude - 1.0).abs() < 0.0001);
    }

    #[test]
    fn test_different_texts_differ() {
        let embedder = HashEmbedder::new(64);
        let a = embedder.embed("revenue of Apex").unwrap();
        let b = embedder.embed("risks at GreenField").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_empty_text_rejected() {
        let embedder = HashEmbedder::new(64);
        assert!(embedder.embed("").is_err());
        assert!(embedder.embed("   \n").is_err());
    }

    #[test]
    fn test_cosine_identical() {
        let v = vec![0.6, 0.8, 0.0];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 0.0001);
    }

    #[test]
    fn test_cosine_orthogonal() {
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 0.0001);
    }

    #[test]
    fn test_cosine_opposite() {
        assert!((cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]) + 1.0).abs() < 0.0001);
    }

    #[test]
    fn test_cosine_zero_vector() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }
}
