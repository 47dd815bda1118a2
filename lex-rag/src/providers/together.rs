//! Together AI embedding provider using the OpenAI-compatible embeddings API.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{http_client, parse_error, status_error, transport_error};
use crate::config::DEFAULT_DIMENSIONS;
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::normalize::zero_pad;

const PROVIDER: &str = "Together";

/// The Together AI embeddings API endpoint.
const TOGETHER_EMBEDDINGS_URL: &str = "https://api.together.xyz/v1/embeddings";

/// Free-tier retrieval model; returns 768-dimensional vectors.
const DEFAULT_MODEL: &str = "togethercomputer/m2-bert-80M-8k-retrieval";

/// An [`EmbeddingProvider`] backed by the Together AI embeddings API.
///
/// The model's native vectors are zero-padded or truncated to
/// [`dimensions`](EmbeddingProvider::dimensions).
///
/// # Example
///
/// ```rust,ignore
/// use lex_rag::TogetherEmbeddingProvider;
///
/// let provider = TogetherEmbeddingProvider::new("tok-...")?;
/// let embedding = provider.embed("hello world").await?;
/// ```
pub struct TogetherEmbeddingProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    endpoint: String,
    dimensions: usize,
}

impl TogetherEmbeddingProvider {
    /// Create a new provider with the given API key.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(RagError::EmbeddingError {
                provider: PROVIDER.into(),
                message: "API key must not be empty".into(),
            });
        }

        Ok(Self {
            client: http_client(super::DEFAULT_TIMEOUT),
            api_key,
            model: DEFAULT_MODEL.into(),
            endpoint: TOGETHER_EMBEDDINGS_URL.into(),
            dimensions: DEFAULT_DIMENSIONS,
        })
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set the length vectors are padded or truncated to.
    pub fn with_dimensions(mut self, dims: usize) -> Self {
        self.dimensions = dims;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = http_client(timeout);
        self
    }
}

// ── API request/response types ─────────────────────────────────────

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: Vec<&'a str>,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[async_trait]
impl EmbeddingProvider for TogetherEmbeddingProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        debug!(provider = PROVIDER, text_len = text.len(), "embedding single text");

        let results = self.embed_batch(&[text]).await?;
        results.into_iter().next().ok_or_else(|| RagError::EmbeddingError {
            provider: PROVIDER.into(),
            message: "API returned empty response".into(),
        })
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        debug!(
            provider = PROVIDER,
            batch_size = texts.len(),
            model = %self.model,
            "embedding batch"
        );

        let request_body = EmbeddingRequest { model: &self.model, input: texts.to_vec() };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| transport_error(PROVIDER, e))?;

        if !response.status().is_success() {
            return Err(status_error(PROVIDER, response).await.into());
        }

        let embedding_response: EmbeddingResponse =
            response.json().await.map_err(|e| parse_error(PROVIDER, e))?;

        let vectors: Vec<Vec<f32>> = embedding_response
            .data
            .into_iter()
            .map(|d| {
                info!(provider = PROVIDER, native_dims = d.embedding.len(), "embedding successful");
                zero_pad(d.embedding, self.dimensions)
            })
            .collect();
        Ok(vectors)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}
