//! In-memory document store using cosine similarity.
//!
//! [`InMemoryDocumentStore`] keeps every [`Document`] in a `Vec` behind a
//! `tokio::sync::RwLock`. It backs the test suite and `lex serve --memory`.

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use crate::document::{Document, DocumentId, DocumentMatch, NewDocument};
use crate::error::Result;
use crate::store::DocumentStore;

/// A [`DocumentStore`] held entirely in process memory.
///
/// Ids are random UUIDs. Documents are returned in descending cosine
/// similarity; ties keep insertion order.
#[derive(Debug, Default)]
pub struct InMemoryDocumentStore {
    documents: RwLock<Vec<Document>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A snapshot of the stored documents.
    pub async fn documents(&self) -> Vec<Document> {
        self.documents.read().await.clone()
    }
}

/// Compute cosine similarity between two vectors.
///
/// Returns 0.0 if either vector has zero magnitude.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    fn backend(&self) -> &str {
        "InMemory"
    }

    async fn match_documents(
        &self,
        embedding: &[f32],
        match_count: usize,
    ) -> Result<Vec<DocumentMatch>> {
        let documents = self.documents.read().await;

        let mut scored: Vec<DocumentMatch> = documents
            .iter()
            .map(|doc| DocumentMatch {
                id: doc.id.clone(),
                title: doc.title.clone(),
                content: doc.content.clone(),
                kind: doc.kind.clone(),
                similarity: f64::from(cosine_similarity(&doc.embedding, embedding)),
            })
            .collect();

        scored.sort_by(|a, b| {
            b.similarity.partial_cmp(&a.similarity).unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(match_count);
        Ok(scored)
    }

    async fn insert(&self, document: NewDocument) -> Result<DocumentId> {
        let id = DocumentId::new(uuid::Uuid::new_v4().to_string());
        let mut documents = self.documents.write().await;
        documents.push(Document {
            id: id.clone(),
            title: document.title,
            content: document.content,
            kind: document.kind,
            embedding: document.embedding,
        });
        debug!(id = %id, total = documents.len(), "inserted document");
        Ok(id)
    }

    async fn clear(&self) -> Result<()> {
        self.documents.write().await.clear();
        Ok(())
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.documents.read().await.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cosine_of_identical_and_orthogonal_vectors() {
        assert!((cosine_similarity(&[1.0, 2.0], &[1.0, 2.0]) - 1.0).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }
}
