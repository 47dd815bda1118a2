//! Shared reqwest plumbing for hosted providers.

use std::time::Duration;

use serde::Deserialize;
use tracing::error;

use crate::upstream::UpstreamError;

/// Per-call timeout used when a caller does not configure one.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub fn client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder().timeout(timeout).build().unwrap_or_else(|_| reqwest::Client::new())
}

/// Error payloads seen across providers: OpenAI-style `{error: {message}}`,
/// Hugging Face `{error}`, and Cohere `{message}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum ErrorBody {
    Nested { error: ErrorDetail },
    Flat { error: String },
    Message { message: String },
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

fn error_detail(body: String) -> String {
    match serde_json::from_str::<ErrorBody>(&body) {
        Ok(ErrorBody::Nested { error }) => error.message,
        Ok(ErrorBody::Flat { error }) => error,
        Ok(ErrorBody::Message { message }) => message,
        Err(_) => body,
    }
}

/// Turn a non-success response into an [`UpstreamError`], pulling the most
/// useful message out of the body.
pub async fn status_error(provider: &str, response: reqwest::Response) -> UpstreamError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    error!(provider, %status, "API error");
    UpstreamError::status(provider, status.as_u16(), error_detail(body))
}

pub fn transport_error(provider: &str, e: reqwest::Error) -> UpstreamError {
    error!(provider, error = %e, "request failed");
    UpstreamError::transport(provider, format!("request failed: {e}"))
}

pub fn parse_error(provider: &str, e: reqwest::Error) -> UpstreamError {
    error!(provider, error = %e, "failed to parse response");
    UpstreamError::transport(provider, format!("failed to parse response: {e}"))
}
