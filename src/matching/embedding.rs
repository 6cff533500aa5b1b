//! Deterministic content-hash embeddings

use crate::error::{Result, TalentMatcherError};
use sha2::{Digest, Sha256};

/// Text to fixed-length vector mapping. The engine only assumes stability
/// and a fixed dimension, so a learned model can be substituted behind this
/// trait without touching anything else.
pub trait EmbeddingGenerator: Send + Sync {
    fn embed(&self, text: &str) -> Vec<f32>;
    fn dimension(&self) -> usize;
}

/// Hash-derived embedding: a stable fingerprint of the input text, not a
/// semantic representation. Each hex-digit pair of the Sha256 digest becomes
/// one component in [0,1); the vector is zero-padded out to the configured
/// dimension. Identical text always yields a bit-identical vector.
pub struct HashEmbedder {
    dimension: usize,
}

impl HashEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(384)
    }
}

impl EmbeddingGenerator for HashEmbedder {
    fn embed(&self, text: &str) -> Vec<f32> {
        let digest = hex::encode(Sha256::digest(text.as_bytes()));

        let mut embedding: Vec<f32> = digest
            .as_bytes()
            .chunks(2)
            .take(self.dimension)
            .map(|pair| {
                // Always valid: the hex alphabet guarantees a parseable pair.
                let value = u8::from_str_radix(std::str::from_utf8(pair).unwrap_or("0"), 16)
                    .unwrap_or(0);
                value as f32 / 255.0
            })
            .collect();

        embedding.resize(self.dimension, 0.0);
        embedding
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Calculate cosine similarity between two embeddings
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32> {
    if a.len() != b.len() {
        return Err(TalentMatcherError::Embedding(format!(
            "Embedding dimensions don't match: {} vs {}",
            a.len(),
            b.len()
        )));
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }

    Ok(dot_product / (norm_a * norm_b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedding_is_deterministic() {
        let embedder = HashEmbedder::default();
        let first = embedder.embed("python react senior engineer");
        let second = embedder.embed("python react senior engineer");
        assert_eq!(first, second);
    }

    #[test]
    fn test_embedding_dimension_is_fixed() {
        let embedder = HashEmbedder::default();
        assert_eq!(embedder.embed("short").len(), 384);
        assert_eq!(embedder.embed("").len(), 384);
        assert_eq!(embedder.embed(&"x".repeat(10_000)).len(), 384);
    }

    #[test]
    fn test_embedding_components_in_unit_range() {
        let embedder = HashEmbedder::default();
        let embedding = embedder.embed("docker kubernetes terraform");
        assert!(embedding.iter().all(|v| (0.0..=1.0).contains(v)));
    }

    #[test]
    fn test_different_texts_differ() {
        let embedder = HashEmbedder::default();
        assert_ne!(embedder.embed("rust"), embedder.embed("go"));
    }

    #[test]
    fn test_truncation_to_small_dimension() {
        let embedder = HashEmbedder::new(8);
        assert_eq!(embedder.embed("anything at all").len(), 8);
    }

    #[test]
    fn test_cosine_similarity_identity() {
        let v = vec![0.5, 0.2, 0.9];
        let score = cosine_similarity(&v, &v).unwrap();
        assert!((score - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_similarity_zero_norm() {
        let zero = vec![0.0, 0.0, 0.0];
        let other = vec![1.0, 2.0, 3.0];
        assert_eq!(cosine_similarity(&zero, &other).unwrap(), 0.0);
    }

    #[test]
    fn test_cosine_similarity_dimension_mismatch() {
        let result = cosine_similarity(&[1.0, 2.0], &[1.0, 2.0, 3.0]);
        assert!(result.is_err());
    }
}
