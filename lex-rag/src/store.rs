//! Document store trait for similarity search over the legal corpus.

use async_trait::async_trait;

use crate::document::{DocumentId, DocumentMatch, NewDocument};
use crate::error::Result;

/// A storage backend holding legal documents and their embeddings.
///
/// Implementations expose a single similarity-search entry point plus the
/// minimal CRUD needed by ingestion and setup verification. Errors are
/// reported as [`RagError::StoreError`](crate::RagError::StoreError) and are
/// never retried.
///
/// # Example
///
/// ```rust,ignore
/// use lex_rag::{DocumentStore, InMemoryDocumentStore};
///
/// let store = InMemoryDocumentStore::new();
/// let id = store.insert(new_document).await?;
/// let matches = store.match_documents(&query_embedding, 5).await?;
/// ```
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// A short backend name used in logs and errors.
    fn backend(&self) -> &str;

    /// Return up to `match_count` documents ordered by descending similarity.
    async fn match_documents(
        &self,
        embedding: &[f32],
        match_count: usize,
    ) -> Result<Vec<DocumentMatch>>;

    /// Insert a document and return the identifier the store assigned.
    async fn insert(&self, document: NewDocument) -> Result<DocumentId>;

    /// Delete every document.
    async fn clear(&self) -> Result<()>;

    /// Number of stored documents.
    async fn count(&self) -> Result<usize>;
}
