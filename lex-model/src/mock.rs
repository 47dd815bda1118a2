//! Mock completion provider for testing.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use lex_core::{CompletionProvider, LexError, Message, Result, UpstreamError};

/// A scripted [`CompletionProvider`].
///
/// Replies are consumed in order; once the script runs out the fallback reply
/// is repeated. Every call's user message is recorded.
pub struct MockCompletion {
    name: String,
    script: Mutex<VecDeque<Result<String>>>,
    fallback: MockReply,
    calls: AtomicUsize,
    seen: Mutex<Vec<(String, Vec<Message>)>>,
}

#[derive(Clone)]
enum MockReply {
    Answer(String),
    Status(u16),
}

impl MockCompletion {
    /// A provider that always answers `answer`.
    pub fn answering(answer: impl Into<String>) -> Self {
        Self::with_reply("mock", MockReply::Answer(answer.into()))
    }

    /// A provider that always fails with the given upstream HTTP status.
    pub fn failing(status: u16) -> Self {
        Self::with_reply("mock", MockReply::Status(status))
    }

    fn with_reply(name: &str, fallback: MockReply) -> Self {
        Self {
            name: name.to_string(),
            script: Mutex::new(VecDeque::new()),
            fallback,
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Queue a one-off reply ahead of the fallback.
    pub fn then(self, reply: Result<String>) -> Self {
        if let Ok(mut script) = self.script.lock() {
            script.push_back(reply);
        }
        self
    }

    /// Number of `complete` calls received.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// `(system_prompt, messages)` of every call, oldest first.
    pub fn seen(&self) -> Vec<(String, Vec<Message>)> {
        self.seen.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl CompletionProvider for MockCompletion {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(&self, system_prompt: &str, messages: &[Message]) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut seen) = self.seen.lock() {
            seen.push((system_prompt.to_string(), messages.to_vec()));
        }

        if let Some(reply) = self.script.lock().ok().and_then(|mut s| s.pop_front()) {
            return reply;
        }
        match &self.fallback {
            MockReply::Answer(answer) => Ok(answer.clone()),
            MockReply::Status(status) => Err(LexError::Upstream(UpstreamError::status(
                self.name.clone(),
                *status,
                "mock failure",
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn script_runs_before_fallback() {
        let mock = MockCompletion::answering("steady").then(Err(LexError::Model("once".into())));
        assert!(mock.complete("s", &[Message::user("q")]).await.is_err());
        assert_eq!(mock.complete("s", &[Message::user("q")]).await.unwrap(), "steady");
        assert_eq!(mock.calls(), 2);
        assert_eq!(mock.seen()[1].1[0].content, "q");
    }
}
