//! Embedding provider trait for generating vector embeddings from text.

use async_trait::async_trait;

use crate::error::Result;

/// An embedding together with the provider that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddingOutcome {
    pub vector: Vec<f32>,
    /// Name of the provider that served the request.
    pub provider: String,
    /// `true` when the vector is the deterministic hash fallback and carries
    /// no semantic meaning.
    pub synthetic: bool,
}

/// A provider that generates vector embeddings from text input.
///
/// Implementations wrap specific embedding backends (Together, Cohere,
/// Hugging Face, ...) behind a unified async interface. The default
/// [`embed_batch`](EmbeddingProvider::embed_batch) implementation calls
/// [`embed`](EmbeddingProvider::embed) sequentially; backends that support
/// native batching should override it.
///
/// # Example
///
/// ```rust,ignore
/// use lex_rag::EmbeddingProvider;
///
/// let provider = TogetherEmbeddingProvider::new("key")?;
/// let embedding = provider.embed("hello world").await?;
/// assert_eq!(embedding.len(), provider.dimensions());
/// ```
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// A short name used in logs (e.g. `"Cohere"`).
    fn name(&self) -> &str;

    /// Generate an embedding vector for a single text input.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate an embedding and report which provider produced it.
    ///
    /// Chains override this to name the member that answered.
    async fn embed_with_source(&self, text: &str) -> Result<EmbeddingOutcome> {
        let vector = self.embed(text).await?;
        Ok(EmbeddingOutcome { vector, provider: self.name().to_string(), synthetic: false })
    }

    /// Generate embedding vectors for a batch of text inputs.
    ///
    /// The default implementation calls [`embed`](EmbeddingProvider::embed)
    /// sequentially for each input.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed(text).await?);
        }
        Ok(results)
    }

    /// Return the dimensionality of embeddings produced by this provider.
    fn dimensions(&self) -> usize;
}
