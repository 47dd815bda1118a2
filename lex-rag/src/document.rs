//! Data types for documents, matches, and answer sources.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Opaque document identifier.
///
/// The datastore may key rows by UUID or by integer; both are carried as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for DocumentId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Signed(i64),
            Unsigned(u64),
        }

        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(s) => DocumentId(s),
            RawId::Signed(n) => DocumentId(n.to_string()),
            RawId::Unsigned(n) => DocumentId(n.to_string()),
        })
    }
}

/// The category of a legal document. Unknown tags are preserved verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DocumentKind {
    Lawyer,
    Case,
    Article,
    Other(String),
}

impl DocumentKind {
    pub fn as_str(&self) -> &str {
        match self {
            DocumentKind::Lawyer => "lawyer",
            DocumentKind::Case => "case",
            DocumentKind::Article => "article",
            DocumentKind::Other(tag) => tag,
        }
    }
}

impl From<String> for DocumentKind {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "lawyer" => DocumentKind::Lawyer,
            "case" => DocumentKind::Case,
            "article" => DocumentKind::Article,
            _ => DocumentKind::Other(tag),
        }
    }
}

impl From<DocumentKind> for String {
    fn from(kind: DocumentKind) -> Self {
        kind.as_str().to_string()
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored legal document with its embedding.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    pub id: DocumentId,
    pub title: String,
    pub content: String,
    #[serde(rename = "type")]
    pub kind: DocumentKind,
    pub embedding: Vec<f32>,
}

/// A document submitted for insertion; the store assigns the id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewDocument {
    pub title: String,
    pub content: String,
    #[serde(rename = "type")]
    pub kind: DocumentKind,
    pub embedding: Vec<f32>,
}

/// A row returned by similarity search.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentMatch {
    pub id: DocumentId,
    pub title: String,
    pub content: String,
    #[serde(rename = "type")]
    pub kind: DocumentKind,
    /// Cosine similarity; higher is more similar.
    pub similarity: f64,
}

impl DocumentMatch {
    /// Render as `[TYPE] Title\nContent` for the completion prompt.
    pub fn render(&self) -> String {
        format!("[{}] {}\n{}", self.kind.as_str().to_uppercase(), self.title, self.content)
    }
}

/// A cited source in an answer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Source {
    pub id: DocumentId,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: DocumentKind,
    pub similarity: f64,
}

impl From<&DocumentMatch> for Source {
    fn from(m: &DocumentMatch) -> Self {
        Source {
            id: m.id.clone(),
            title: m.title.clone(),
            kind: m.kind.clone(),
            similarity: m.similarity,
        }
    }
}
