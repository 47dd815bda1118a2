//! Failures reported by hosted providers.

use std::fmt;

/// How a failed upstream call should be treated by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamKind {
    /// The provider rejected our credentials (HTTP 401).
    Auth,
    /// The provider is rate limiting us (HTTP 429).
    Quota,
    /// Network error, 5xx, malformed payload, timeout, or any other status.
    Transient,
}

/// A failed call to a hosted embedding or completion provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamError {
    /// Name of the provider that failed (e.g. `"Together"`).
    pub provider: String,
    /// HTTP status, when the provider answered at all.
    pub status: Option<u16>,
    /// A short description of the failure.
    pub message: String,
}

impl UpstreamError {
    pub fn new(
        provider: impl Into<String>,
        status: Option<u16>,
        message: impl Into<String>,
    ) -> Self {
        Self { provider: provider.into(), status, message: message.into() }
    }

    /// A failure where no HTTP response was received.
    pub fn transport(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(provider, None, message)
    }

    /// A non-success HTTP response.
    pub fn status(provider: impl Into<String>, status: u16, message: impl Into<String>) -> Self {
        Self::new(provider, Some(status), message)
    }

    pub fn kind(&self) -> UpstreamKind {
        match self.status {
            Some(401) => UpstreamKind::Auth,
            Some(429) => UpstreamKind::Quota,
            _ => UpstreamKind::Transient,
        }
    }
}

impl fmt::Display for UpstreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "{} returned {}: {}", self.provider, status, self.message),
            None => write!(f, "{}: {}", self.provider, self.message),
        }
    }
}

impl std::error::Error for UpstreamError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_by_status() {
        assert_eq!(UpstreamError::status("A", 401, "bad key").kind(), UpstreamKind::Auth);
        assert_eq!(UpstreamError::status("A", 429, "slow down").kind(), UpstreamKind::Quota);
        assert_eq!(UpstreamError::status("A", 503, "loading").kind(), UpstreamKind::Transient);
        assert_eq!(UpstreamError::transport("A", "refused").kind(), UpstreamKind::Transient);
    }

    #[test]
    fn display_includes_status_when_present() {
        let failed = UpstreamError::status("Cohere", 500, "boom");
        assert_eq!(failed.to_string(), "Cohere returned 500: boom");
        assert_eq!(UpstreamError::transport("Cohere", "refused").to_string(), "Cohere: refused");
    }
}
