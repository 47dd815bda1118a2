//! Hugging Face Inference feature-extraction provider.
//!
//! Works without an API key. Several sentence-transformer endpoints are tried
//! in order because any of them may be cold or unavailable.

use std::time::Duration;

use async_trait::async_trait;
use lex_core::UpstreamError;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::{http_client, parse_error, status_error, transport_error};
use crate::config::DEFAULT_MODEL_LOADING_DELAY;
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};

const PROVIDER: &str = "HuggingFace";

/// Endpoints tried in order; the first to return a non-empty vector wins.
pub const HUGGING_FACE_ENDPOINTS: [&str; 4] = [
    "https://api-inference.huggingface.co/models/sentence-transformers/all-MiniLM-L6-v2",
    "https://api-inference.huggingface.co/models/sentence-transformers/all-mpnet-base-v2",
    "https://api-inference.huggingface.co/models/sentence-transformers/paraphrase-MiniLM-L6-v2",
    "https://api-inference.huggingface.co/pipeline/feature-extraction/sentence-transformers/all-MiniLM-L6-v2",
];

/// A keyless [`EmbeddingProvider`] that walks a list of Hugging Face
/// feature-extraction endpoints.
///
/// Vectors are returned at the model's native length (384 or 768); the
/// fallback chain tiles them to the canonical length.
pub struct HuggingFaceEmbeddingProvider {
    client: reqwest::Client,
    endpoints: Vec<String>,
    api_token: Option<String>,
    model_loading_delay: Duration,
}

impl Default for HuggingFaceEmbeddingProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl HuggingFaceEmbeddingProvider {
    pub fn new() -> Self {
        Self {
            client: http_client(super::DEFAULT_TIMEOUT),
            endpoints: HUGGING_FACE_ENDPOINTS.iter().map(|e| e.to_string()).collect(),
            api_token: None,
            model_loading_delay: DEFAULT_MODEL_LOADING_DELAY,
        }
    }

    /// Replace the endpoint list.
    pub fn with_endpoints<I, S>(mut self, endpoints: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.endpoints = endpoints.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    /// Delay before the single retry of an endpoint that answered 503.
    pub fn with_model_loading_delay(mut self, delay: Duration) -> Self {
        self.model_loading_delay = delay;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = http_client(timeout);
        self
    }

    async fn call(
        &self,
        endpoint: &str,
        text: &str,
    ) -> std::result::Result<Vec<f32>, UpstreamError> {
        let mut request = self.client.post(endpoint).json(&FeatureRequest { inputs: text });
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| transport_error(PROVIDER, e))?;
        if !response.status().is_success() {
            return Err(status_error(PROVIDER, response).await);
        }

        let parsed: FeatureResponse = response.json().await.map_err(|e| parse_error(PROVIDER, e))?;
        match parsed.into_vector() {
            Some(vector) if !vector.is_empty() => Ok(vector),
            _ => Err(UpstreamError::transport(PROVIDER, "response contained no embedding")),
        }
    }

    /// One endpoint, retried once after the loading delay if it answers 503.
    async fn try_endpoint(
        &self,
        endpoint: &str,
        text: &str,
    ) -> std::result::Result<Vec<f32>, UpstreamError> {
        match self.call(endpoint, text).await {
            Err(e) if e.status == Some(503) => {
                warn!(
                    provider = PROVIDER,
                    model = model_name(endpoint),
                    delay_ms = self.model_loading_delay.as_millis() as u64,
                    "model loading, waiting before retry"
                );
                tokio::time::sleep(self.model_loading_delay).await;
                self.call(endpoint, text).await
            }
            other => other,
        }
    }
}

fn model_name(endpoint: &str) -> &str {
    endpoint.rsplit('/').next().unwrap_or(endpoint)
}

#[derive(Serialize)]
struct FeatureRequest<'a> {
    inputs: &'a str,
}

/// Feature extraction answers with a nested list, a flat list, or an object
/// carrying `embeddings`, depending on the endpoint.
#[derive(Deserialize)]
#[serde(untagged)]
enum FeatureResponse {
    Nested(Vec<Vec<f32>>),
    Flat(Vec<f32>),
    Wrapped { embeddings: Vec<Vec<f32>> },
}

impl FeatureResponse {
    fn into_vector(self) -> Option<Vec<f32>> {
        match self {
            FeatureResponse::Nested(rows) | FeatureResponse::Wrapped { embeddings: rows } => {
                rows.into_iter().next()
            }
            FeatureResponse::Flat(vector) => Some(vector),
        }
    }
}

#[async_trait]
impl EmbeddingProvider for HuggingFaceEmbeddingProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        debug!(provider = PROVIDER, endpoints = self.endpoints.len(), "embedding single text");

        let mut last_error: Option<UpstreamError> = None;
        for endpoint in &self.endpoints {
            match self.try_endpoint(endpoint, text).await {
                Ok(vector) => {
                    info!(
                        provider = PROVIDER,
                        model = model_name(endpoint),
                        native_dims = vector.len(),
                        "embedding successful"
                    );
                    return Ok(vector);
                }
                Err(e) => {
                    warn!(
                        provider = PROVIDER,
                        model = model_name(endpoint),
                        error = %e,
                        "endpoint unavailable"
                    );
                    last_error = Some(e);
                }
            }
        }

        // Exhaustion is always transient, whatever the last endpoint answered.
        let message = match last_error {
            Some(e) => format!("all {} endpoints failed, last: {e}", self.endpoints.len()),
            None => "no endpoints configured".to_string(),
        };
        Err(RagError::Upstream(UpstreamError::transport(PROVIDER, message)))
    }

    /// Native length of the first endpoint's model.
    fn dimensions(&self) -> usize {
        384
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn response_shapes_normalise_to_first_vector() {
        let nested: FeatureResponse = serde_json::from_str("[[0.5, 0.25], [9.0]]").unwrap();
        assert_eq!(nested.into_vector(), Some(vec![0.5, 0.25]));

        let flat: FeatureResponse = serde_json::from_str("[0.5, 0.25]").unwrap();
        assert_eq!(flat.into_vector(), Some(vec![0.5, 0.25]));

        let wrapped: FeatureResponse = serde_json::from_str(r#"{"embeddings": [[1.0]]}"#).unwrap();
        assert_eq!(wrapped.into_vector(), Some(vec![1.0]));

        let empty: FeatureResponse = serde_json::from_str("[]").unwrap();
        assert_eq!(empty.into_vector(), None);
    }

    #[test]
    fn model_name_is_last_path_segment() {
        assert_eq!(model_name(HUGGING_FACE_ENDPOINTS[1]), "all-mpnet-base-v2");
    }
}
