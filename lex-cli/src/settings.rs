//! Runtime settings read from the environment.

use std::time::Duration;

use anyhow::{Context, Result};

/// Everything the binary needs to wire providers and the store.
///
/// Provider keys are optional: a missing key drops that provider from its
/// fallback chain. Blank values count as missing.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub together_api_key: Option<String>,
    pub cohere_api_key: Option<String>,
    pub hf_api_token: Option<String>,
    pub groq_api_key: Option<String>,
    pub supabase_url: Option<String>,
    pub supabase_service_role_key: Option<String>,
    pub database_url: Option<String>,
    pub host: String,
    pub port: u16,
    /// Per-call timeout for every outbound HTTP client.
    pub http_timeout: Duration,
    /// Overall deadline for one `/ask` request.
    pub request_timeout: Duration,
    pub model_loading_delay: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            together_api_key: None,
            cohere_api_key: None,
            hf_api_token: None,
            groq_api_key: None,
            supabase_url: None,
            supabase_service_role_key: None,
            database_url: None,
            host: "127.0.0.1".to_string(),
            port: 3000,
            http_timeout: Duration::from_secs(30),
            request_timeout: Duration::from_secs(90),
            model_loading_delay: Duration::from_secs(10),
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        let secs = |key: &str, default: Duration| -> Result<Duration> {
            match get(key) {
                Some(raw) => raw
                    .parse::<u64>()
                    .map(Duration::from_secs)
                    .with_context(|| format!("{key} must be whole seconds, got {raw:?}")),
                None => Ok(default),
            }
        };

        let port = match get("LEX_PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .with_context(|| format!("LEX_PORT must be a port number, got {raw:?}"))?,
            None => defaults.port,
        };

        Ok(Self {
            together_api_key: get("TOGETHER_API_KEY"),
            cohere_api_key: get("COHERE_API_KEY"),
            hf_api_token: get("HF_API_TOKEN"),
            groq_api_key: get("GROQ_API_KEY"),
            supabase_url: get("SUPABASE_URL").or_else(|| get("NEXT_PUBLIC_SUPABASE_URL")),
            supabase_service_role_key: get("SUPABASE_SERVICE_ROLE_KEY"),
            database_url: get("DATABASE_URL"),
            host: get("LEX_HOST").unwrap_or(defaults.host),
            port,
            http_timeout: secs("LEX_HTTP_TIMEOUT_SECS", defaults.http_timeout)?,
            request_timeout: secs("LEX_REQUEST_TIMEOUT_SECS", defaults.request_timeout)?,
            model_loading_delay: secs(
                "LEX_MODEL_LOADING_DELAY_SECS",
                defaults.model_loading_delay,
            )?,
        })
    }
}
