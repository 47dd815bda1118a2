//! Hugging Face Inference text-generation provider.
//!
//! Sends a single text-generation request to a small instruction-tuned model
//! (Phi-3 mini by default). The chat is rendered with Phi-3's role markup
//! since the endpoint only accepts a flat prompt.

use std::time::Duration;

use async_trait::async_trait;
use lex_core::http;
use lex_core::{CompletionProvider, Message, Result, first_user_content};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE, EMPTY_ANSWER};

const PROVIDER: &str = "HuggingFace";

/// Default text-generation endpoint.
pub const DEFAULT_ENDPOINT: &str =
    "https://api-inference.huggingface.co/models/microsoft/Phi-3-mini-4k-instruct";

/// A keyless [`CompletionProvider`] backed by the Hugging Face Inference API.
pub struct HuggingFaceTextGeneration {
    client: reqwest::Client,
    endpoint: String,
    api_token: Option<String>,
    temperature: f32,
    max_new_tokens: u32,
}

impl Default for HuggingFaceTextGeneration {
    fn default() -> Self {
        Self::new()
    }
}

impl HuggingFaceTextGeneration {
    pub fn new() -> Self {
        Self {
            client: http::client(http::DEFAULT_TIMEOUT),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_token: None,
            temperature: DEFAULT_TEMPERATURE,
            max_new_tokens: DEFAULT_MAX_TOKENS,
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Send `Authorization: Bearer <token>`; anonymous access is used otherwise.
    pub fn with_api_token(mut self, token: impl Into<String>) -> Self {
        self.api_token = Some(token.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = http::client(timeout);
        self
    }
}

/// Render the system prompt and first user message with Phi-3 chat markup.
pub fn phi3_prompt(system_prompt: &str, user_message: &str) -> String {
    format!("<|system|>\n{system_prompt}<|end|>\n<|user|>\n{user_message}<|end|>\n<|assistant|>\n")
}

#[derive(Serialize)]
struct GenerationRequest {
    inputs: String,
    parameters: GenerationParameters,
}

#[derive(Serialize)]
struct GenerationParameters {
    max_new_tokens: u32,
    temperature: f32,
    return_full_text: bool,
}

#[derive(Deserialize)]
struct Generated {
    #[serde(default)]
    generated_text: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum GenerationResponse {
    Many(Vec<Generated>),
    One(Generated),
}

impl GenerationResponse {
    fn into_text(self) -> Option<String> {
        match self {
            GenerationResponse::Many(items) => items.into_iter().next()?.generated_text,
            GenerationResponse::One(item) => item.generated_text,
        }
    }
}

#[async_trait]
impl CompletionProvider for HuggingFaceTextGeneration {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn complete(&self, system_prompt: &str, messages: &[Message]) -> Result<String> {
        debug!(provider = PROVIDER, endpoint = %self.endpoint, "text generation");

        let body = GenerationRequest {
            inputs: phi3_prompt(system_prompt, first_user_content(messages)),
            parameters: GenerationParameters {
                max_new_tokens: self.max_new_tokens,
                temperature: self.temperature,
                return_full_text: false,
            },
        };

        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| http::transport_error(PROVIDER, e))?;
        if !response.status().is_success() {
            return Err(http::status_error(PROVIDER, response).await.into());
        }

        let parsed: GenerationResponse =
            response.json().await.map_err(|e| http::parse_error(PROVIDER, e))?;
        let answer = parsed
            .into_text()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| EMPTY_ANSWER.to_string());

        info!(provider = PROVIDER, answer_len = answer.len(), "completion successful");
        Ok(answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_uses_phi3_markup() {
        assert_eq!(
            phi3_prompt("sys", "usr"),
            "<|system|>\nsys<|end|>\n<|user|>\nusr<|end|>\n<|assistant|>\n"
        );
    }

    #[test]
    fn both_response_shapes_yield_text() {
        let many: GenerationResponse =
            serde_json::from_str(r#"[{"generated_text":"a"},{"generated_text":"b"}]"#).unwrap();
        assert_eq!(many.into_text().as_deref(), Some("a"));

        let one: GenerationResponse = serde_json::from_str(r#"{"generated_text":"c"}"#).unwrap();
        assert_eq!(one.into_text().as_deref(), Some("c"));

        let empty: GenerationResponse = serde_json::from_str("[]").unwrap();
        assert_eq!(empty.into_text(), None);
    }
}
