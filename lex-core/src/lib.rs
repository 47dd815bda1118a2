//! # lex-core
//!
//! Shared vocabulary for the Lex crates.
//!
//! ## Overview
//!
//! - [`Message`] / [`Role`] - chat messages passed to completion providers
//! - [`CompletionProvider`] - the capability every language-model backend implements
//! - [`UpstreamError`] - a failed call to a hosted provider, with its HTTP status
//! - [`LexError`] - the error type shared by provider crates
//! - `http` - reqwest helpers mapping failed calls to [`UpstreamError`] (feature `http`)

pub mod completion;
pub mod error;
#[cfg(feature = "http")]
pub mod http;
pub mod message;
pub mod upstream;

pub use completion::CompletionProvider;
pub use error::{LexError, Result};
pub use message::{Message, Role, first_user_content};
pub use upstream::{UpstreamError, UpstreamKind};
