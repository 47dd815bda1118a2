//! Error types for the `lex-rag` crate.

use lex_core::{UpstreamError, UpstreamKind};
use thiserror::Error;

/// Errors that can occur in RAG operations.
#[derive(Debug, Error)]
pub enum RagError {
    /// A hosted embedding provider call failed.
    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    /// An embedding provider could not be constructed or returned nothing usable.
    #[error("Embedding error ({provider}): {message}")]
    EmbeddingError {
        /// The embedding provider that produced the error.
        provider: String,
        /// A description of the failure.
        message: String,
    },

    /// An error occurred in the document store backend.
    #[error("Document store error ({backend}): {message}")]
    StoreError {
        /// The document store backend that produced the error.
        backend: String,
        /// A description of the failure.
        message: String,
    },

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// An error in the answer pipeline orchestration.
    #[error("Pipeline error: {0}")]
    PipelineError(String),

    /// An error propagated from `lex-core`.
    #[error(transparent)]
    LexError(#[from] lex_core::LexError),
}

impl RagError {
    /// The underlying provider failure, if there is one.
    pub fn upstream(&self) -> Option<&UpstreamError> {
        match self {
            RagError::Upstream(e) => Some(e),
            RagError::LexError(lex_core::LexError::Upstream(e)) => Some(e),
            _ => None,
        }
    }

    pub fn upstream_kind(&self) -> Option<UpstreamKind> {
        self.upstream().map(UpstreamError::kind)
    }

    pub(crate) fn store(backend: &str, message: impl Into<String>) -> Self {
        RagError::StoreError { backend: backend.to_string(), message: message.into() }
    }
}

/// A convenience result type for RAG operations.
pub type Result<T> = std::result::Result<T, RagError>;
