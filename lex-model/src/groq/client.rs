//! Groq client implementation.

use async_trait::async_trait;
use lex_core::http;
use lex_core::{CompletionProvider, LexError, Message, Result, Role};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::config::GroqConfig;
use crate::EMPTY_ANSWER;

const PROVIDER: &str = "Groq";

/// Groq chat completion client.
pub struct GroqClient {
    client: reqwest::Client,
    config: GroqConfig,
}

impl GroqClient {
    /// Create a new Groq client.
    ///
    /// # Errors
    ///
    /// Returns [`LexError::Config`] when the API key is empty.
    pub fn new(config: GroqConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(LexError::Config("Groq API key must not be empty".into()));
        }
        Ok(Self { client: http::client(config.timeout), config })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }
}

// ── Chat completion request/response types ─────────────────────────

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

fn build_messages<'a>(system_prompt: &'a str, messages: &'a [Message]) -> Vec<ChatMessage<'a>> {
    std::iter::once(ChatMessage { role: Role::System.as_str(), content: system_prompt })
        .chain(messages.iter().map(|m| ChatMessage { role: m.role.as_str(), content: &m.content }))
        .collect()
}

#[async_trait]
impl CompletionProvider for GroqClient {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn complete(&self, system_prompt: &str, messages: &[Message]) -> Result<String> {
        debug!(
            provider = PROVIDER,
            model = %self.config.model,
            messages = messages.len(),
            "chat completion"
        );

        let body = ChatRequest {
            model: &self.config.model,
            messages: build_messages(system_prompt, messages),
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let response = self
            .client
            .post(self.config.chat_completions_url())
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| http::transport_error(PROVIDER, e))?;

        if !response.status().is_success() {
            return Err(http::status_error(PROVIDER, response).await.into());
        }

        let parsed: ChatResponse =
            response.json().await.map_err(|e| http::parse_error(PROVIDER, e))?;

        let answer = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.is_empty())
            .unwrap_or_else(|| EMPTY_ANSWER.to_string());

        info!(provider = PROVIDER, answer_len = answer.len(), "completion successful");
        Ok(answer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_key_is_rejected() {
        assert!(matches!(GroqClient::new(GroqConfig::new("  ")), Err(LexError::Config(_))));
    }

    #[test]
    fn system_prompt_comes_first() {
        let messages = [Message::user("Context: x\n\nQuestion: y")];
        let built = build_messages("be brief", &messages);
        let json = serde_json::to_value(&built).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                {"role": "system", "content": "be brief"},
                {"role": "user", "content": "Context: x\n\nQuestion: y"}
            ])
        );
    }
}
