//! Completion provider trait.

use async_trait::async_trait;

use crate::error::Result;
use crate::message::Message;

/// A language-model backend that turns a system prompt and a list of chat
/// messages into answer text.
///
/// Implementations normalise their provider's response shape so callers only
/// ever see a plain `String`.
///
/// # Example
///
/// ```rust,ignore
/// use lex_core::{CompletionProvider, Message};
///
/// let answer = provider.complete("Be concise.", &[Message::user("What is RICO?")]).await?;
/// ```
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// A short name used in logs (e.g. `"Groq"`).
    fn name(&self) -> &str;

    /// Generate an answer for `messages` under `system_prompt`.
    async fn complete(&self, system_prompt: &str, messages: &[Message]) -> Result<String>;
}
