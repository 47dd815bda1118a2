//! # lex-telemetry
//!
//! Structured logging for the Lex binaries.
//!
//! [`init_telemetry`] installs a global `tracing` subscriber filtered by
//! `RUST_LOG` (default `info`). Output is human-readable unless
//! `LEX_LOG_FORMAT=json`, in which case one JSON object is written per event.
//!
//! [`InMemoryEventLayer`] records events for assertions in tests.

pub mod memory;

pub use memory::{CapturedEvent, CapturedEvents, InMemoryEventLayer};

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{EnvFilter, fmt};

/// Environment variable selecting the log output format.
pub const LOG_FORMAT_ENV: &str = "LEX_LOG_FORMAT";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl LogFormat {
    /// `json` (any case) selects [`LogFormat::Json`]; anything else is pretty.
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("json") { LogFormat::Json } else { LogFormat::Pretty }
    }

    pub fn from_env() -> Self {
        std::env::var(LOG_FORMAT_ENV).map(|v| Self::parse(&v)).unwrap_or_default()
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber using the format from `LEX_LOG_FORMAT`.
///
/// Fails if a global subscriber is already set.
pub fn init_telemetry(service: &str) -> Result<(), TryInitError> {
    init_with_format(service, LogFormat::from_env())
}

pub fn init_with_format(service: &str, format: LogFormat) -> Result<(), TryInitError> {
    let registry = tracing_subscriber::registry().with(env_filter());
    match format {
        LogFormat::Pretty => registry.with(fmt::layer().with_target(true)).try_init()?,
        LogFormat::Json => {
            let json = fmt::layer().json().flatten_event(true).with_current_span(true);
            registry.with(json).try_init()?
        }
    }
    tracing::info!(service, ?format, "telemetry initialized");
    Ok(())
}

/// Install the global subscriber with an extra [`InMemoryEventLayer`].
pub fn init_with_capture(service: &str, events: CapturedEvents) -> Result<(), TryInitError> {
    tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt::layer().with_test_writer())
        .with(InMemoryEventLayer::new(events))
        .try_init()?;
    tracing::info!(service, "telemetry initialized with capture");
    Ok(())
}
