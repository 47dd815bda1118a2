//! # lex-rag
//!
//! Retrieval-augmented question answering over a legal document corpus.
//!
//! ## Overview
//!
//! - [`FallbackEmbedder`] - embeds text through an ordered provider chain
//!   (Together → Cohere → Hugging Face → deterministic hash), always yielding
//!   exactly [`RagConfig::dimensions`] components
//! - [`DocumentStore`] - similarity search and CRUD over the document table
//!   ([`SupabaseStore`], [`InMemoryDocumentStore`], and `PgVectorStore` behind
//!   the `pgvector` feature)
//! - [`AnswerPipeline`] - validate → embed → retrieve → build context →
//!   complete → shape the answer
//! - [`Ingestor`] - clears the store and loads the [`seed`] corpus
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use lex_rag::{AnswerPipeline, FallbackEmbedder, InMemoryDocumentStore, RagConfig};
//!
//! let pipeline = AnswerPipeline::builder()
//!     .config(RagConfig::default())
//!     .embedder(Arc::new(FallbackEmbedder::builder().build()))
//!     .store(Arc::new(InMemoryDocumentStore::new()))
//!     .completion(completion)
//!     .build()?;
//!
//! let answer = pipeline.answer("What is RICO?").await?;
//! ```

pub mod answer;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod fallback;
pub mod inmemory;
pub mod ingest;
pub mod normalize;
#[cfg(feature = "pgvector")]
pub mod pgvector;
pub mod providers;
pub mod seed;
pub mod store;
pub mod supabase;

pub use answer::{
    Answer, AnswerPipeline, AnswerPipelineBuilder, AskError, AskStage, CONTEXT_SEPARATOR,
    NO_MATCH_ANSWER, SYSTEM_PROMPT, build_context, parse_question, user_prompt,
};
pub use config::{RagConfig, RagConfigBuilder};
pub use document::{Document, DocumentId, DocumentKind, DocumentMatch, NewDocument, Source};
pub use embedding::{EmbeddingOutcome, EmbeddingProvider};
pub use error::{RagError, Result};
pub use fallback::{FallbackEmbedder, FallbackEmbedderBuilder};
pub use inmemory::InMemoryDocumentStore;
pub use ingest::{IngestReport, Ingestor};
#[cfg(feature = "pgvector")]
pub use pgvector::PgVectorStore;
pub use providers::{
    CohereEmbeddingProvider, HashEmbeddingProvider, HuggingFaceEmbeddingProvider,
    TogetherEmbeddingProvider, hash_embedding,
};
pub use seed::{SeedDocument, seed_corpus};
pub use store::DocumentStore;
pub use supabase::SupabaseStore;
