//! Ordered embedding fallback chain.
//!
//! [`FallbackEmbedder`] asks each configured provider in turn and keeps the
//! first non-empty vector. When every provider fails it synthesises a
//! [`hash_embedding`](crate::providers::hash_embedding), so a vector is always
//! produced. The result is always tiled or truncated to the configured
//! dimensionality.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use lex_rag::{CohereEmbeddingProvider, FallbackEmbedder, HuggingFaceEmbeddingProvider};
//!
//! let embedder = FallbackEmbedder::builder()
//!     .provider(Arc::new(CohereEmbeddingProvider::new(key)?))
//!     .provider(Arc::new(HuggingFaceEmbeddingProvider::new()))
//!     .build();
//! let vector = embedder.embed("What is RICO?").await?;
//! assert_eq!(vector.len(), 1536);
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use lex_core::UpstreamKind;
use tracing::{error, info, warn};

use crate::config::{DEFAULT_DIMENSIONS, RagConfig};
use crate::embedding::{EmbeddingOutcome, EmbeddingProvider};
use crate::error::Result;
use crate::normalize::tile;
use crate::providers::HashEmbeddingProvider;

/// An [`EmbeddingProvider`] that walks an ordered provider list.
///
/// A 401 or 429 from the *first* provider is returned immediately (when
/// `short_circuit_first` is set) because it signals a credential or billing
/// problem the operator has to fix. Every other failure, including 401/429
/// from later providers, falls through to the next provider.
pub struct FallbackEmbedder {
    providers: Vec<Arc<dyn EmbeddingProvider>>,
    synthetic: HashEmbeddingProvider,
    dimensions: usize,
    short_circuit_first: bool,
}

impl FallbackEmbedder {
    pub fn builder() -> FallbackEmbedderBuilder {
        FallbackEmbedderBuilder::default()
    }

    pub fn providers(&self) -> &[Arc<dyn EmbeddingProvider>] {
        &self.providers
    }

    fn synthesize(&self, text: &str) -> EmbeddingOutcome {
        warn!(
            provider = "hash",
            synthetic = true,
            "all embedding providers failed; using hash embedding, search quality will be poor"
        );
        EmbeddingOutcome {
            vector: self.synthetic.generate(text),
            provider: "hash".to_string(),
            synthetic: true,
        }
    }
}

#[async_trait]
impl EmbeddingProvider for FallbackEmbedder {
    fn name(&self) -> &str {
        "fallback"
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.embed_with_source(text).await?.vector)
    }

    async fn embed_with_source(&self, text: &str) -> Result<EmbeddingOutcome> {
        for (position, provider) in self.providers.iter().enumerate() {
            match provider.embed_with_source(text).await {
                Ok(outcome) if !outcome.vector.is_empty() => {
                    info!(
                        provider = %outcome.provider,
                        position,
                        native_dims = outcome.vector.len(),
                        synthetic = outcome.synthetic,
                        "embedding served"
                    );
                    let vector = tile(outcome.vector, self.dimensions);
                    return Ok(EmbeddingOutcome { vector, ..outcome });
                }
                Ok(_) => {
                    warn!(
                        provider = provider.name(),
                        position,
                        "provider returned an empty embedding"
                    );
                }
                Err(e) => {
                    let fatal =
                        matches!(e.upstream_kind(), Some(UpstreamKind::Auth | UpstreamKind::Quota));
                    if position == 0 && self.short_circuit_first && fatal {
                        error!(
                            provider = provider.name(),
                            error = %e,
                            "primary embedding provider rejected the request"
                        );
                        return Err(e);
                    }
                    warn!(
                        provider = provider.name(),
                        position,
                        error = %e,
                        "embedding provider failed, falling back"
                    );
                }
            }
        }

        let outcome = self.synthesize(text);
        Ok(EmbeddingOutcome { vector: tile(outcome.vector, self.dimensions), ..outcome })
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

/// Builder for [`FallbackEmbedder`].
pub struct FallbackEmbedderBuilder {
    providers: Vec<Arc<dyn EmbeddingProvider>>,
    dimensions: usize,
    short_circuit_first: bool,
}

impl Default for FallbackEmbedderBuilder {
    fn default() -> Self {
        Self { providers: Vec::new(), dimensions: DEFAULT_DIMENSIONS, short_circuit_first: true }
    }
}

impl FallbackEmbedderBuilder {
    /// Append a provider; providers are tried in the order they are added.
    pub fn provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    /// Take `dimensions` and `short_circuit_first_provider` from `config`.
    pub fn config(mut self, config: &RagConfig) -> Self {
        self.dimensions = config.dimensions;
        self.short_circuit_first = config.short_circuit_first_provider;
        self
    }

    pub fn dimensions(mut self, dimensions: usize) -> Self {
        self.dimensions = dimensions;
        self
    }

    pub fn short_circuit_first(mut self, enabled: bool) -> Self {
        self.short_circuit_first = enabled;
        self
    }

    pub fn build(self) -> FallbackEmbedder {
        FallbackEmbedder {
            providers: self.providers,
            synthetic: HashEmbeddingProvider::new(self.dimensions),
            dimensions: self.dimensions,
            short_circuit_first: self.short_circuit_first,
        }
    }
}
