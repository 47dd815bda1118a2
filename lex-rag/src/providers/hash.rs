//! Deterministic hash embedding, the last resort of the fallback chain.
//!
//! The vectors are purely structural: identical text maps to identical
//! vectors, but distances between different texts mean nothing. Search
//! quality is poor whenever these vectors are in play.

use async_trait::async_trait;

use crate::config::DEFAULT_DIMENSIONS;
use crate::embedding::{EmbeddingOutcome, EmbeddingProvider};
use crate::error::Result;

/// 32-bit `h = h * 31 + c` over UTF-16 code units, wrapping on overflow.
fn string_hash(units: impl Iterator<Item = u16>) -> i32 {
    units.fold(0i32, |h, c| h.wrapping_shl(5).wrapping_sub(h).wrapping_add(i32::from(c)))
}

/// Build a `dims`-length vector in `[-1, 1)` from `text`.
///
/// Component `i` is derived from the hash of `text` followed by the decimal
/// digits of `i`, so every component depends on the whole input.
pub fn hash_embedding(text: &str, dims: usize) -> Vec<f32> {
    (0..dims)
        .map(|i| {
            let suffix = i.to_string();
            let hash = string_hash(text.encode_utf16().chain(suffix.encode_utf16()));
            let seed = i64::from(hash).unsigned_abs();
            (seed % 2000) as f32 / 1000.0 - 1.0
        })
        .collect()
}

/// An infallible [`EmbeddingProvider`] producing [`hash_embedding`] vectors.
#[derive(Debug, Clone, Copy)]
pub struct HashEmbeddingProvider {
    dimensions: usize,
}

impl Default for HashEmbeddingProvider {
    fn default() -> Self {
        Self::new(DEFAULT_DIMENSIONS)
    }
}

impl HashEmbeddingProvider {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    /// The embedding, without the `Result` wrapper.
    pub fn generate(&self, text: &str) -> Vec<f32> {
        hash_embedding(text, self.dimensions)
    }
}

#[async_trait]
impl EmbeddingProvider for HashEmbeddingProvider {
    fn name(&self) -> &str {
        "hash"
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.generate(text))
    }

    async fn embed_with_source(&self, text: &str) -> Result<EmbeddingOutcome> {
        Ok(EmbeddingOutcome {
            vector: self.generate(text),
            provider: self.name().to_string(),
            synthetic: true,
        })
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
