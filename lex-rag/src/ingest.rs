//! Batch ingestion of a corpus into a [`DocumentStore`].

use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info, warn};

use crate::document::NewDocument;
use crate::embedding::EmbeddingProvider;
use crate::seed::SeedDocument;
use crate::store::DocumentStore;

/// Outcome of one ingestion run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestReport {
    pub inserted: usize,
    pub failed: usize,
    /// Documents whose embedding came from the hash fallback.
    pub synthetic: usize,
}

/// Replaces the store contents with an embedded corpus.
///
/// The store is cleared first so re-running leaves exactly one copy of each
/// document. A failure on one document is logged and counted; the rest of the
/// batch still runs.
pub struct Ingestor {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn DocumentStore>,
    dimensions: usize,
}

impl Ingestor {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn DocumentStore>,
        dimensions: usize,
    ) -> Self {
        Self { embedder, store, dimensions }
    }

    pub async fn run(&self, documents: &[SeedDocument]) -> IngestReport {
        info!(backend = self.store.backend(), documents = documents.len(), "starting ingestion");

        match self.store.clear().await {
            Ok(()) => info!(backend = self.store.backend(), "cleared existing documents"),
            Err(e) => warn!(
                backend = self.store.backend(),
                error = %e,
                "could not clear existing documents"
            ),
        }

        let mut report = IngestReport::default();
        for doc in documents {
            let outcome = match self.embedder.embed_with_source(&doc.embedding_text()).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!(title = %doc.title, error = %e, "embedding failed");
                    report.failed += 1;
                    continue;
                }
            };

            if outcome.vector.len() != self.dimensions {
                warn!(
                    title = %doc.title,
                    len = outcome.vector.len(),
                    expected = self.dimensions,
                    "embedding has unexpected length"
                );
            }
            if outcome.synthetic {
                report.synthetic += 1;
            }

            let new_doc = NewDocument {
                title: doc.title.clone(),
                content: doc.content.clone(),
                kind: doc.kind.clone(),
                embedding: outcome.vector,
            };
            match self.store.insert(new_doc).await {
                Ok(id) => {
                    info!(
                        title = %doc.title,
                        kind = %doc.kind,
                        id = %id,
                        provider = %outcome.provider,
                        "inserted document"
                    );
                    report.inserted += 1;
                }
                Err(e) => {
                    error!(title = %doc.title, error = %e, "insert failed");
                    report.failed += 1;
                }
            }
        }

        if report.synthetic > 0 {
            warn!(
                synthetic = report.synthetic,
                "some documents were embedded with the hash fallback; semantic search will be poor"
            );
        }
        info!(inserted = report.inserted, failed = report.failed, "ingestion finished");
        report
    }
}
