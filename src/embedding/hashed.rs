//! Deterministic in-process embedding provider.

use std::hash::{DefaultHasher, Hash, Hasher};

use async_trait::async_trait;

use super::EmbeddingProvider;
use crate::error::IndexError;

/// Hashed bag-of-words embedder.
///
/// Each lowercased token is hashed onto one bucket of a fixed-dimension
/// vector, and the result is L2-normalized. Vectors are deterministic for
/// identical input, and texts sharing tokens score positive cosine
/// similarity — enough signal for offline deployments and hermetic tests,
/// with no model download and no network.
pub struct HashedEmbedder {
    model_id: String,
    dim: usize,
}

impl HashedEmbedder {
    pub const DEFAULT_DIM: usize = 384;

    pub fn new(model_id: impl Into<String>, dim: usize) -> Self {
        Self {
            model_id: model_id.into(),
            dim: dim.max(1),
        }
    }

    /// Vector dimension; fixed for the lifetime of the instance.
    pub fn dim(&self) -> usize {
        self.dim
    }

    fn embed_one(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dim];
        for token in text.split_whitespace() {
            let token = token
                .trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase();
            if token.is_empty() {
                continue;
            }
            let mut hasher = DefaultHasher::new();
            token.hash(&mut hasher);
            let bucket = (hasher.finish() % self.dim as u64) as usize;
            vector[bucket] += 1.0;
        }

        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for value in &mut vector {
                *value /= norm;
            }
        }
        vector
    }
}

#[async_trait]
impl EmbeddingProvider for HashedEmbedder {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, IndexError> {
        Ok(texts.iter().map(|text| self.embed_one(text)).collect())
    }
}
