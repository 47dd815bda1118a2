//! The bundled sample corpus: five lawyer profiles, five case summaries and
//! five articles.

use serde::{Deserialize, Serialize};

use crate::document::DocumentKind;
use crate::error::{RagError, Result};

const SEED_CORPUS: &str = include_str!("../data/seed_corpus.json");

/// A corpus entry before embedding.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SeedDocument {
    pub title: String,
    pub content: String,
    #[serde(rename = "type")]
    pub kind: DocumentKind,
}

impl SeedDocument {
    pub fn new(title: impl Into<String>, content: impl Into<String>, kind: DocumentKind) -> Self {
        Self { title: title.into(), content: content.into(), kind }
    }

    /// Text that gets embedded: title, blank line, content.
    pub fn embedding_text(&self) -> String {
        format!("{}\n\n{}", self.title, self.content)
    }
}

/// Parse the bundled corpus.
pub fn seed_corpus() -> Result<Vec<SeedDocument>> {
    serde_json::from_str(SEED_CORPUS)
        .map_err(|e| RagError::ConfigError(format!("invalid seed corpus: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corpus_has_five_of_each_kind() {
        let corpus = seed_corpus().unwrap();
        assert_eq!(corpus.len(), 15);
        for kind in [DocumentKind::Lawyer, DocumentKind::Case, DocumentKind::Article] {
            assert_eq!(corpus.iter().filter(|d| d.kind == kind).count(), 5, "{kind}");
        }
        assert!(corpus.iter().any(|d| d.title.starts_with("Understanding RICO")));
    }

    #[test]
    fn embedding_text_joins_title_and_content() {
        let doc = SeedDocument::new("T", "C", DocumentKind::Case);
        assert_eq!(doc.embedding_text(), "T\n\nC");
    }
}
