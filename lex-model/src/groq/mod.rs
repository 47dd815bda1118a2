//! Groq provider implementation.
//!
//! Groq serves open-weight models behind an OpenAI-compatible chat
//! completion API. The default model is `llama-3.1-8b-instant`.
//!
//! # Example
//!
//! ```rust,ignore
//! use lex_model::groq::{GroqClient, GroqConfig};
//!
//! let client = GroqClient::new(GroqConfig::new(std::env::var("GROQ_API_KEY")?))?;
//! ```

mod client;
mod config;

pub use client::GroqClient;
pub use config::{DEFAULT_MODEL, GROQ_API_BASE, GroqConfig};
