//! Ingestion of the seed corpus into the in-memory store.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use lex_core::UpstreamError;
use lex_rag::{
    DocumentId, DocumentKind, DocumentMatch, DocumentStore, EmbeddingProvider, FallbackEmbedder,
    HashEmbeddingProvider, InMemoryDocumentStore, IngestReport, Ingestor, NewDocument, RagError,
    SeedDocument, seed_corpus,
};

/// Fails every call whose text starts with `poison`.
struct PoisonedEmbedder {
    poison: &'static str,
}

#[async_trait]
impl EmbeddingProvider for PoisonedEmbedder {
    fn name(&self) -> &str {
        "poisoned"
    }

    async fn embed(&self, text: &str) -> lex_rag::Result<Vec<f32>> {
        if text.starts_with(self.poison) {
            return Err(UpstreamError::status("Together", 429, "quota").into());
        }
        Ok(HashEmbeddingProvider::new(8).generate(text))
    }

    fn dimensions(&self) -> usize {
        8
    }
}

/// An in-memory store whose `clear` always fails.
#[derive(Default)]
struct UnclearableStore {
    inner: InMemoryDocumentStore,
    clears: AtomicUsize,
}

#[async_trait]
impl DocumentStore for UnclearableStore {
    fn backend(&self) -> &str {
        "unclearable"
    }

    async fn match_documents(
        &self,
        embedding: &[f32],
        match_count: usize,
    ) -> lex_rag::Result<Vec<DocumentMatch>> {
        self.inner.match_documents(embedding, match_count).await
    }

    async fn insert(&self, document: NewDocument) -> lex_rag::Result<DocumentId> {
        self.inner.insert(document).await
    }

    async fn clear(&self) -> lex_rag::Result<()> {
        self.clears.fetch_add(1, Ordering::SeqCst);
        Err(RagError::StoreError {
            backend: "unclearable".into(),
            message: "permission denied".into(),
        })
    }

    async fn count(&self) -> lex_rag::Result<usize> {
        self.inner.count().await
    }
}

#[tokio::test]
async fn reingesting_replaces_instead_of_duplicating() {
    let corpus = seed_corpus().unwrap();
    let store = Arc::new(InMemoryDocumentStore::new());
    let embedder = Arc::new(FallbackEmbedder::builder().build());
    let ingestor = Ingestor::new(embedder, store.clone(), 1536);

    let first = ingestor.run(&corpus).await;
    let second = ingestor.run(&corpus).await;

    assert_eq!(first, IngestReport { inserted: 15, failed: 0, synthetic: 15 });
    assert_eq!(second, first);
    assert_eq!(store.count().await.unwrap(), corpus.len());

    let stored = store.documents().await;
    assert!(stored.iter().all(|d| d.embedding.len() == 1536));
    assert_eq!(stored.iter().filter(|d| d.kind == DocumentKind::Lawyer).count(), 5);
}

#[tokio::test]
async fn one_failing_document_does_not_abort_the_batch() {
    let corpus = vec![
        SeedDocument::new("Alpha", "first", DocumentKind::Case),
        SeedDocument::new("Poison", "second", DocumentKind::Case),
        SeedDocument::new("Gamma", "third", DocumentKind::Article),
    ];
    let store = Arc::new(InMemoryDocumentStore::new());
    let ingestor = Ingestor::new(Arc::new(PoisonedEmbedder { poison: "Poison" }), store.clone(), 8);

    let report = ingestor.run(&corpus).await;
    assert_eq!(report.inserted, 2);
    assert_eq!(report.failed, 1);

    let titles: Vec<String> = store.documents().await.into_iter().map(|d| d.title).collect();
    assert_eq!(titles, ["Alpha", "Gamma"]);
}

#[tokio::test]
async fn clear_failure_is_not_fatal() {
    let store = Arc::new(UnclearableStore::default());
    let ingestor = Ingestor::new(Arc::new(HashEmbeddingProvider::new(8)), store.clone(), 8);

    let report = ingestor.run(&[SeedDocument::new("Only", "doc", DocumentKind::Lawyer)]).await;
    assert_eq!(report.inserted, 1);
    assert_eq!(store.clears.load(Ordering::SeqCst), 1);
    assert_eq!(store.count().await.unwrap(), 1);
}

#[tokio::test]
async fn documents_are_embedded_with_title_and_content() {
    let store = Arc::new(InMemoryDocumentStore::new());
    let ingestor = Ingestor::new(Arc::new(HashEmbeddingProvider::new(8)), store.clone(), 8);
    let doc = SeedDocument::new("Sarah Chen", "Environmental law.", DocumentKind::Lawyer);

    ingestor.run(std::slice::from_ref(&doc)).await;

    let stored = store.documents().await;
    let expected = HashEmbeddingProvider::new(8).generate("Sarah Chen\n\nEnvironmental law.");
    assert_eq!(stored[0].embedding, expected);
}
