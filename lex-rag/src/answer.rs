//! Question answering orchestrator.
//!
//! [`AnswerPipeline`] runs one question through a fixed sequence of stages:
//! validate, embed, retrieve, build context, complete, respond. Every stage
//! transition emits one `info` event carrying the stage name and the request
//! id. A failing stage ends the request with an [`AskError`].
//!
//! # Example
//!
//! ```rust,ignore
//! use lex_rag::{AnswerPipeline, RagConfig};
//!
//! let pipeline = AnswerPipeline::builder()
//!     .config(RagConfig::default())
//!     .embedder(embedder)
//!     .store(store)
//!     .completion(completion)
//!     .build()?;
//!
//! let answer = pipeline.ask(br#"{"question": "What is RICO?"}"#).await?;
//! println!("{} ({} sources)", answer.answer, answer.sources.len());
//! ```

use std::fmt;
use std::sync::Arc;

use lex_core::{CompletionProvider, LexError, Message, UpstreamKind};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{Instrument, error, info, info_span, warn};
use uuid::Uuid;

use crate::config::RagConfig;
use crate::document::{DocumentMatch, Source};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::normalize::tile;
use crate::store::DocumentStore;

/// Fixed instruction sent with every completion request.
pub const SYSTEM_PROMPT: &str = "You are a legal AI assistant.\n\
Answer only from the provided context.\n\
If the answer is not in the context, say you do not know.\n\
Be accurate, concise, and cite the sources when relevant.";

/// Returned verbatim, with no sources, when retrieval finds nothing.
pub const NO_MATCH_ANSWER: &str =
    "I do not have enough information to answer this question based on the available legal documents.";

/// Placed between rendered documents in the completion context.
pub const CONTEXT_SEPARATOR: &str = "\n\n---\n\n";

const EMPTY_ANSWER: &str = "I do not know.";

const COMPLETION_FAILED: &str = "Failed to generate response. Please try again.";

/// Lifecycle of a single question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AskStage {
    Received,
    Validated,
    Embedded,
    Retrieved,
    ContextBuilt,
    Completed,
    Responded,
    Errored,
}

impl AskStage {
    pub fn as_str(self) -> &'static str {
        match self {
            AskStage::Received => "received",
            AskStage::Validated => "validated",
            AskStage::Embedded => "embedded",
            AskStage::Retrieved => "retrieved",
            AskStage::ContextBuilt => "context_built",
            AskStage::Completed => "completed",
            AskStage::Responded => "responded",
            AskStage::Errored => "errored",
        }
    }
}

impl fmt::Display for AskStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A generated answer with the documents it was grounded on, in retrieval order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Answer {
    pub answer: String,
    pub sources: Vec<Source>,
}

/// Why a question could not be answered.
///
/// The `Display` text is safe to return to callers; it never includes raw
/// provider payloads.
#[derive(Debug, Error)]
pub enum AskError {
    #[error("Question is required")]
    BadRequest,

    #[error("{provider} API authentication failed. Please check your API key.")]
    Unauthorized { provider: String },

    #[error("{provider} API quota exceeded. Please check your {provider} account billing and quota limits.")]
    QuotaExceeded { provider: String },

    #[error("Failed to search legal documents")]
    SearchFailed(#[source] RagError),

    #[error("{0}")]
    CompletionFailed(String),

    #[error("Request timed out")]
    Timeout,

    /// Detail is kept for logs only.
    #[error("Internal server error")]
    Internal(String),
}

impl AskError {
    /// HTTP status code for this failure.
    pub fn status(&self) -> u16 {
        match self {
            AskError::BadRequest => 400,
            AskError::Unauthorized { .. } => 401,
            AskError::QuotaExceeded { .. } => 429,
            AskError::SearchFailed(_)
            | AskError::CompletionFailed(_)
            | AskError::Internal(_) => 500,
            AskError::Timeout => 504,
        }
    }

    /// Short caller-facing message.
    pub fn message(&self) -> String {
        self.to_string()
    }

    fn from_embedding(e: RagError) -> Self {
        let provider = e.upstream().map(|u| u.provider.clone()).unwrap_or_default();
        match e.upstream_kind() {
            Some(UpstreamKind::Auth) => AskError::Unauthorized { provider },
            Some(UpstreamKind::Quota) => AskError::QuotaExceeded { provider },
            _ => AskError::Internal(format!("embedding failed: {e}")),
        }
    }
}

#[derive(Deserialize)]
struct AskRequest {
    #[serde(default)]
    question: Option<serde_json::Value>,
}

/// Extract the question from a raw `{"question": "..."}` request body.
///
/// Malformed JSON, a missing or non-string `question`, and blank text are all
/// [`AskError::BadRequest`]. The returned question is trimmed.
pub fn parse_question(body: &[u8]) -> std::result::Result<String, AskError> {
    let request: AskRequest = serde_json::from_slice(body).map_err(|_| AskError::BadRequest)?;
    match request.question {
        Some(serde_json::Value::String(q)) if !q.trim().is_empty() => Ok(q.trim().to_string()),
        _ => Err(AskError::BadRequest),
    }
}

/// Only chain-level failures carry a caller-safe message; anything from a
/// single provider may echo the upstream response body.
fn completion_message(error: &LexError) -> String {
    match error {
        LexError::Model(message) if !message.trim().is_empty() => message.clone(),
        other => {
            warn!(error = %other, "completion failed outside a fallback chain");
            COMPLETION_FAILED.to_string()
        }
    }
}

/// Render matches as `[TYPE] Title\nContent` blocks joined by [`CONTEXT_SEPARATOR`].
pub fn build_context(matches: &[DocumentMatch]) -> String {
    matches.iter().map(DocumentMatch::render).collect::<Vec<_>>().join(CONTEXT_SEPARATOR)
}

/// The single user message sent to the completion provider.
pub fn user_prompt(context: &str, question: &str) -> String {
    format!("Context:\n{context}\n\nQuestion: {question}\n\nAnswer:")
}

/// Per-request state carried through the stages.
struct AskRun {
    request_id: Uuid,
}

impl AskRun {
    fn stage(&self, stage: AskStage) {
        info!(request_id = %self.request_id, stage = stage.as_str(), "ask stage");
    }

    fn fail(&self, err: AskError) -> AskError {
        match &err {
            AskError::BadRequest => warn!(
                request_id = %self.request_id,
                stage = AskStage::Errored.as_str(),
                status = err.status(),
                "rejected question"
            ),
            AskError::SearchFailed(source) => error!(
                request_id = %self.request_id,
                stage = AskStage::Errored.as_str(),
                status = err.status(),
                error = %source,
                "ask failed"
            ),
            AskError::Internal(detail) => error!(
                request_id = %self.request_id,
                stage = AskStage::Errored.as_str(),
                status = err.status(),
                error = %detail,
                "ask failed"
            ),
            _ => error!(
                request_id = %self.request_id,
                stage = AskStage::Errored.as_str(),
                status = err.status(),
                error = %err,
                "ask failed"
            ),
        }
        err
    }
}

/// Answers legal questions from the document store.
///
/// Construct one via [`AnswerPipeline::builder()`]. The pipeline holds only
/// shared, read-only handles and is safe to use from many requests at once.
pub struct AnswerPipeline {
    config: RagConfig,
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn DocumentStore>,
    completion: Arc<dyn CompletionProvider>,
}

impl AnswerPipeline {
    pub fn builder() -> AnswerPipelineBuilder {
        AnswerPipelineBuilder::default()
    }

    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    pub fn embedder(&self) -> &Arc<dyn EmbeddingProvider> {
        &self.embedder
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    /// Answer a raw request body of the form `{"question": "..."}`.
    pub async fn ask(&self, body: &[u8]) -> std::result::Result<Answer, AskError> {
        let run = AskRun { request_id: Uuid::new_v4() };
        let span = info_span!("ask", request_id = %run.request_id);
        async move {
            run.stage(AskStage::Received);
            let question = parse_question(body).map_err(|e| run.fail(e))?;
            self.run(&run, &question).await
        }
        .instrument(span)
        .await
    }

    /// Answer an already-extracted question.
    pub async fn answer(&self, question: &str) -> std::result::Result<Answer, AskError> {
        let run = AskRun { request_id: Uuid::new_v4() };
        let span = info_span!("ask", request_id = %run.request_id);
        async move {
            run.stage(AskStage::Received);
            let question = question.trim();
            if question.is_empty() {
                return Err(run.fail(AskError::BadRequest));
            }
            self.run(&run, question).await
        }
        .instrument(span)
        .await
    }

    async fn run(&self, run: &AskRun, question: &str) -> std::result::Result<Answer, AskError> {
        run.stage(AskStage::Validated);

        let outcome = self
            .embedder
            .embed_with_source(question)
            .await
            .map_err(|e| run.fail(AskError::from_embedding(e)))?;
        if outcome.synthetic {
            warn!(
                request_id = %run.request_id,
                "query embedding is synthetic; results will be low quality"
            );
        }
        let vector = if outcome.vector.len() == self.config.dimensions {
            outcome.vector
        } else {
            tile(outcome.vector, self.config.dimensions)
        };
        run.stage(AskStage::Embedded);

        let matches = self
            .store
            .match_documents(&vector, self.config.match_count)
            .await
            .map_err(|e| run.fail(AskError::SearchFailed(e)))?;
        info!(
            request_id = %run.request_id,
            matches = matches.len(),
            embedding_provider = %outcome.provider,
            "retrieval finished"
        );
        run.stage(AskStage::Retrieved);

        if matches.is_empty() {
            run.stage(AskStage::Responded);
            return Ok(Answer { answer: NO_MATCH_ANSWER.to_string(), sources: Vec::new() });
        }

        let context = build_context(&matches);
        run.stage(AskStage::ContextBuilt);

        let messages = [Message::user(user_prompt(&context, question))];
        let text = self
            .completion
            .complete(SYSTEM_PROMPT, &messages)
            .await
            .map_err(|e| run.fail(AskError::CompletionFailed(completion_message(&e))))?;
        run.stage(AskStage::Completed);

        let answer = if text.trim().is_empty() { EMPTY_ANSWER.to_string() } else { text };
        let sources = matches.iter().map(Source::from).collect();
        run.stage(AskStage::Responded);
        Ok(Answer { answer, sources })
    }
}

/// Builder for [`AnswerPipeline`].
#[derive(Default)]
pub struct AnswerPipelineBuilder {
    config: Option<RagConfig>,
    embedder: Option<Arc<dyn EmbeddingProvider>>,
    store: Option<Arc<dyn DocumentStore>>,
    completion: Option<Arc<dyn CompletionProvider>>,
}

impl AnswerPipelineBuilder {
    pub fn config(mut self, config: RagConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn embedder(mut self, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    pub fn store(mut self, store: Arc<dyn DocumentStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn completion(mut self, completion: Arc<dyn CompletionProvider>) -> Self {
        self.completion = Some(completion);
        self
    }

    /// Build the pipeline. A missing config falls back to [`RagConfig::default`].
    ///
    /// # Errors
    ///
    /// Returns [`RagError::ConfigError`] if the embedder, store, or completion
    /// provider was not set.
    pub fn build(self) -> Result<AnswerPipeline> {
        Ok(AnswerPipeline {
            config: self.config.unwrap_or_default(),
            embedder: self
                .embedder
                .ok_or_else(|| RagError::ConfigError("embedder is required".into()))?,
            store: self
                .store
                .ok_or_else(|| RagError::ConfigError("document store is required".into()))?,
            completion: self
                .completion
                .ok_or_else(|| RagError::ConfigError("completion provider is required".into()))?,
        })
    }
}
