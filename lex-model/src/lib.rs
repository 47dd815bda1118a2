//! # lex-model
//!
//! Completion provider integrations for Lex.
//!
//! ## Overview
//!
//! - [`GroqClient`] - Groq's OpenAI-compatible chat completion API (keyed)
//! - [`HuggingFaceTextGeneration`] - Hugging Face Inference text generation (keyless)
//! - [`FallbackCompletion`] - tries an ordered list of providers until one answers
//! - [`MockCompletion`] - scripted provider for testing
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use lex_model::{FallbackCompletion, GroqClient, GroqConfig, HuggingFaceTextGeneration};
//!
//! let chain = FallbackCompletion::new(vec![
//!     Arc::new(GroqClient::new(GroqConfig::new(std::env::var("GROQ_API_KEY")?))?),
//!     Arc::new(HuggingFaceTextGeneration::new()),
//! ]);
//! let answer = chain.complete(SYSTEM_PROMPT, &[Message::user("What is RICO?")]).await?;
//! ```
//!
//! ## Sampling
//!
//! Both hosted providers default to temperature `0.3` and a `1000`-token output cap.

pub mod fallback;
#[cfg(feature = "groq")]
pub mod groq;
#[cfg(feature = "huggingface")]
pub mod huggingface;
pub mod mock;

pub use fallback::FallbackCompletion;
#[cfg(feature = "groq")]
pub use groq::{GroqClient, GroqConfig};
#[cfg(feature = "huggingface")]
pub use huggingface::HuggingFaceTextGeneration;
pub use mock::MockCompletion;

/// Sampling temperature used by every hosted completion provider.
pub const DEFAULT_TEMPERATURE: f32 = 0.3;

/// Output token cap used by every hosted completion provider.
pub const DEFAULT_MAX_TOKENS: u32 = 1000;

/// Answer text used when a provider responds without any generated text.
pub const EMPTY_ANSWER: &str = "I do not know.";
