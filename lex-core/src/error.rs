//! Error types shared across the Lex crates.

use thiserror::Error;

use crate::upstream::{UpstreamError, UpstreamKind};

/// Errors produced by provider crates.
#[derive(Debug, Error)]
pub enum LexError {
    /// A hosted provider call failed.
    #[error(transparent)]
    Upstream(#[from] UpstreamError),

    /// A language-model call failed after all fallbacks.
    #[error("{0}")]
    Model(String),

    /// A configuration validation error.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl LexError {
    /// The upstream classification, if this error came from a provider response.
    pub fn upstream_kind(&self) -> Option<UpstreamKind> {
        match self {
            LexError::Upstream(e) => Some(e.kind()),
            _ => None,
        }
    }
}

/// A convenience result type for Lex operations.
pub type Result<T> = std::result::Result<T, LexError>;
