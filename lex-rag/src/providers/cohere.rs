//! Cohere embedding provider.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{http_client, parse_error, status_error, transport_error};
use crate::config::DEFAULT_DIMENSIONS;
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::normalize::zero_pad;

const PROVIDER: &str = "Cohere";

const COHERE_EMBED_URL: &str = "https://api.cohere.ai/v1/embed";

/// Returns 1024-dimensional vectors.
const DEFAULT_MODEL: &str = "embed-english-v3.0";

/// An [`EmbeddingProvider`] backed by Cohere's `/v1/embed` API.
///
/// Native vectors are zero-padded or truncated to
/// [`dimensions`](EmbeddingProvider::dimensions).
pub struct CohereEmbeddingProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    endpoint: String,
    dimensions: usize,
}

impl CohereEmbeddingProvider {
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
            endpoint: COHERE_EMBED_URL.into(),
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

    pub fn with_dimensions(mut self, dims: usize) -> Self {
        self.dimensions = dims;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = http_client(timeout);
        self
    }
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    texts: Vec<&'a str>,
    input_type: &'a str,
    embedding_types: [&'a str; 1],
}

#[derive(Deserialize)]
struct EmbedResponse {
    embeddings: Embeddings,
}

/// Cohere answers with a bare list of vectors, or with vectors keyed by
/// type when `embedding_types` is requested.
#[derive(Deserialize)]
#[serde(untagged)]
enum Embeddings {
    Plain(Vec<Vec<f32>>),
    ByType { float: Vec<Vec<f32>> },
}

impl Embeddings {
    fn into_vectors(self) -> Vec<Vec<f32>> {
        match self {
            Embeddings::Plain(vectors) => vectors,
            Embeddings::ByType { float } => float,
        }
    }
}

#[async_trait]
impl EmbeddingProvider for CohereEmbeddingProvider {
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

        let request_body = EmbedRequest {
            model: &self.model,
            texts: texts.to_vec(),
            input_type: "search_document",
            embedding_types: ["float"],
        };

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

        let parsed: EmbedResponse = response.json().await.map_err(|e| parse_error(PROVIDER, e))?;
        let vectors = parsed.embeddings.into_vectors();
        if let Some(first) = vectors.first() {
            info!(provider = PROVIDER, native_dims = first.len(), "embedding successful");
        }
        Ok(vectors.into_iter().map(|v| zero_pad(v, self.dimensions)).collect())
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_response_shapes_parse() {
        let plain: EmbedResponse = serde_json::from_str(r#"{"embeddings": [[0.1, 0.2]]}"#).unwrap();
        assert_eq!(plain.embeddings.into_vectors(), vec![vec![0.1, 0.2]]);

        let typed: EmbedResponse =
            serde_json::from_str(r#"{"id": "x", "embeddings": {"float": [[0.3]]}}"#).unwrap();
        assert_eq!(typed.embeddings.into_vectors(), vec![vec![0.3]]);
    }

    #[test]
    fn request_asks_for_float_search_documents() {
        let body = EmbedRequest {
            model: DEFAULT_MODEL,
            texts: vec!["q"],
            input_type: "search_document",
            embedding_types: ["float"],
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({
                "model": "embed-english-v3.0",
                "texts": ["q"],
                "input_type": "search_document",
                "embedding_types": ["float"]
            })
        );
    }
}
