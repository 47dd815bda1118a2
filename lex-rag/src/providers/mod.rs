//! Embedding provider implementations.
//!
//! Every hosted provider maps its raw response into a plain `Vec<f32>` here,
//! so nothing past this module sees provider-specific payload shapes.

mod cohere;
mod hash;
mod huggingface;
mod together;

pub use cohere::CohereEmbeddingProvider;
pub use hash::{HashEmbeddingProvider, hash_embedding};
pub use huggingface::{HUGGING_FACE_ENDPOINTS, HuggingFaceEmbeddingProvider};
pub use together::TogetherEmbeddingProvider;

pub(crate) use lex_core::http::{
    DEFAULT_TIMEOUT, client as http_client, parse_error, status_error, transport_error,
};
