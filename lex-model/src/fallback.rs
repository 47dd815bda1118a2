//! Ordered completion fallback chain.

use std::sync::Arc;

use async_trait::async_trait;
use lex_core::{CompletionProvider, LexError, Message, Result};
use tracing::{info, warn};

/// Message returned when no provider in the chain produced an answer.
pub const ALL_PROVIDERS_FAILED: &str = "Failed to generate response from available LLM services";

/// A [`CompletionProvider`] that tries each wrapped provider in order and
/// returns the first answer.
///
/// Every failure (including auth and quota errors) moves on to the next
/// provider; only when the whole chain is exhausted does the call fail.
pub struct FallbackCompletion {
    providers: Vec<Arc<dyn CompletionProvider>>,
}

impl FallbackCompletion {
    pub fn new(providers: Vec<Arc<dyn CompletionProvider>>) -> Self {
        Self { providers }
    }

    pub fn providers(&self) -> &[Arc<dyn CompletionProvider>] {
        &self.providers
    }
}

#[async_trait]
impl CompletionProvider for FallbackCompletion {
    fn name(&self) -> &str {
        "fallback"
    }

    async fn complete(&self, system_prompt: &str, messages: &[Message]) -> Result<String> {
        for (position, provider) in self.providers.iter().enumerate() {
            match provider.complete(system_prompt, messages).await {
                Ok(answer) => {
                    info!(provider = provider.name(), position, "completion served");
                    return Ok(answer);
                }
                Err(e) => {
                    warn!(
                        provider = provider.name(),
                        position,
                        error = %e,
                        "completion provider failed, falling back"
                    );
                }
            }
        }
        Err(LexError::Model(ALL_PROVIDERS_FAILED.to_string()))
    }
}
