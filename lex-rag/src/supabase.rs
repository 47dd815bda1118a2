//! Supabase (PostgREST) document store backend.
//!
//! Talks to the `legal_documents` table and the `match_legal_documents` SQL
//! function through Supabase's REST gateway. The service-role key is sent as
//! both the `apikey` header and a bearer token.
//!
//! # Example
//!
//! ```rust,ignore
//! use lex_rag::SupabaseStore;
//!
//! let store = SupabaseStore::new("https://xyz.supabase.co", service_role_key)?;
//! let matches = store.match_documents(&query_embedding, 5).await?;
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::RequestBuilder;
use reqwest::header::CONTENT_RANGE;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::document::{DocumentId, DocumentMatch, NewDocument};
use crate::error::{RagError, Result};
use crate::providers::{DEFAULT_TIMEOUT, http_client};
use crate::store::DocumentStore;

const BACKEND: &str = "Supabase";

const TABLE: &str = "legal_documents";

const MATCH_FUNCTION: &str = "match_legal_documents";

/// PostgREST refuses an unfiltered DELETE, so the bulk clear filters on an id
/// no row can carry.
const ZERO_UUID: &str = "00000000-0000-0000-0000-000000000000";

/// A [`DocumentStore`] backed by a Supabase project.
pub struct SupabaseStore {
    client: reqwest::Client,
    base_url: String,
    service_key: String,
}

impl SupabaseStore {
    /// Create a store for the project at `url` using its service-role key.
    pub fn new(url: impl Into<String>, service_key: impl Into<String>) -> Result<Self> {
        let base_url = url.into().trim_end_matches('/').to_string();
        let service_key = service_key.into();
        if base_url.is_empty() {
            return Err(RagError::ConfigError("Supabase URL must not be empty".into()));
        }
        if service_key.trim().is_empty() {
            return Err(RagError::ConfigError("Supabase service role key must not be empty".into()));
        }
        Ok(Self { client: http_client(DEFAULT_TIMEOUT), base_url, service_key })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = http_client(timeout);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{TABLE}", self.base_url)
    }

    fn rpc_url(&self) -> String {
        format!("{}/rest/v1/rpc/{MATCH_FUNCTION}", self.base_url)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        request.header("apikey", &self.service_key).bearer_auth(&self.service_key)
    }

    async fn send(&self, operation: &str, request: RequestBuilder) -> Result<reqwest::Response> {
        let response = self.authorize(request).send().await.map_err(|e| {
            error!(backend = BACKEND, operation, error = %e, "request failed");
            RagError::store(BACKEND, format!("{operation} failed: {e}"))
        })?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let detail =
            serde_json::from_str::<PostgrestError>(&body).map(|e| e.message).unwrap_or(body);
        error!(backend = BACKEND, operation, %status, "request rejected");
        Err(RagError::store(BACKEND, format!("{operation} returned {}: {detail}", status.as_u16())))
    }
}

#[derive(Serialize)]
struct MatchRequest<'a> {
    query_embedding: &'a [f32],
    match_count: usize,
}

#[derive(Deserialize)]
struct InsertedRow {
    id: DocumentId,
}

#[derive(Deserialize)]
struct PostgrestError {
    message: String,
}

/// Total row count from a `Content-Range` header such as `0-14/15` or `*/0`.
fn parse_content_range(value: &str) -> Option<usize> {
    value.rsplit_once('/').and_then(|(_, total)| total.trim().parse().ok())
}

#[async_trait]
impl DocumentStore for SupabaseStore {
    fn backend(&self) -> &str {
        BACKEND
    }

    async fn match_documents(
        &self,
        embedding: &[f32],
        match_count: usize,
    ) -> Result<Vec<DocumentMatch>> {
        let request = self
            .client
            .post(self.rpc_url())
            .json(&MatchRequest { query_embedding: embedding, match_count });
        let response = self.send(MATCH_FUNCTION, request).await?;

        let matches: Vec<DocumentMatch> = response
            .json()
            .await
            .map_err(|e| RagError::store(BACKEND, format!("failed to parse matches: {e}")))?;
        debug!(backend = BACKEND, count = matches.len(), "similarity search complete");
        Ok(matches)
    }

    async fn insert(&self, document: NewDocument) -> Result<DocumentId> {
        let request = self
            .client
            .post(self.table_url())
            .header("Prefer", "return=representation")
            .json(&document);
        let response = self.send("insert", request).await?;

        let rows: Vec<InsertedRow> = response
            .json()
            .await
            .map_err(|e| RagError::store(BACKEND, format!("failed to parse inserted row: {e}")))?;
        rows.into_iter()
            .next()
            .map(|row| row.id)
            .ok_or_else(|| RagError::store(BACKEND, "insert returned no rows"))
    }

    async fn clear(&self) -> Result<()> {
        let request =
            self.client.delete(self.table_url()).query(&[("id", format!("neq.{ZERO_UUID}"))]);
        self.send("clear", request).await?;
        Ok(())
    }

    async fn count(&self) -> Result<usize> {
        let request = self
            .client
            .head(self.table_url())
            .query(&[("select", "id")])
            .header("Prefer", "count=exact");
        let response = self.send("count", request).await?;

        response
            .headers()
            .get(CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_content_range)
            .ok_or_else(|| RagError::store(BACKEND, "no usable Content-Range header in response"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_range_total() {
        assert_eq!(parse_content_range("0-14/15"), Some(15));
        assert_eq!(parse_content_range("*/0"), Some(0));
        assert_eq!(parse_content_range("0-4/*"), None);
        assert_eq!(parse_content_range("garbage"), None);
    }

    #[test]
    fn empty_credentials_are_rejected() {
        assert!(matches!(SupabaseStore::new("", "key"), Err(RagError::ConfigError(_))));
        let blank_key = SupabaseStore::new("https://x.supabase.co", " ");
        assert!(matches!(blank_key, Err(RagError::ConfigError(_))));
    }

    #[test]
    fn urls_drop_trailing_slash() {
        let store = SupabaseStore::new("https://x.supabase.co/", "key").unwrap();
        assert_eq!(store.table_url(), "https://x.supabase.co/rest/v1/legal_documents");
        assert_eq!(store.rpc_url(), "https://x.supabase.co/rest/v1/rpc/match_legal_documents");
    }
}
