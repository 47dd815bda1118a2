//! Subcommand implementations.

use std::fmt;

use anyhow::{Result, bail};
use lex_rag::{DocumentStore, EmbeddingProvider, IngestReport, Ingestor, seed_corpus};
use lex_server::{AppState, ServerConfig, run_server};
use tracing::{info, warn};

use crate::settings::Settings;
use crate::wiring::{Components, components};

const VERIFY_QUERY: &str = "test query about law";

pub async fn serve(
    settings: &Settings,
    host: Option<String>,
    port: Option<u16>,
    memory: bool,
) -> Result<()> {
    let parts = components(settings, memory).await?;
    if memory {
        seed(&parts).await?;
    }

    let config = ServerConfig {
        host: host.unwrap_or_else(|| settings.host.clone()),
        port: port.unwrap_or(settings.port),
    };
    let state = AppState::new(parts.pipeline).with_request_timeout(settings.request_timeout);
    run_server(config, state).await
}

pub async fn ingest(settings: &Settings) -> Result<()> {
    let parts = components(settings, false).await?;
    let report = seed(&parts).await?;
    println!("Inserted {} documents, {} failed", report.inserted, report.failed);
    if report.synthetic > 0 {
        println!(
            "Warning: {} documents used hash-based embeddings; \
             configure an embedding provider for real semantic search",
            report.synthetic
        );
    }
    if report.inserted == 0 {
        bail!("no documents were inserted");
    }
    Ok(())
}

async fn seed(parts: &Components) -> Result<IngestReport> {
    let corpus = seed_corpus()?;
    let ingestor =
        Ingestor::new(parts.embedder.clone(), parts.store.clone(), parts.config.dimensions);
    Ok(ingestor.run(&corpus).await)
}

pub async fn ask(settings: &Settings, question: &str, memory: bool) -> Result<()> {
    let parts = components(settings, memory).await?;
    if memory {
        seed(&parts).await?;
    }

    let answer = parts.pipeline.answer(question).await.map_err(|e| anyhow::anyhow!(e.message()))?;
    println!("{}", answer.answer);
    if !answer.sources.is_empty() {
        println!("\nSources:");
        for source in &answer.sources {
            println!("  [{}] {} (similarity {:.3})", source.kind, source.title, source.similarity);
        }
    }
    Ok(())
}

pub async fn verify(settings: &Settings) -> Result<()> {
    let parts = components(settings, false).await?;
    let checks =
        run_checks(parts.embedder.as_ref(), parts.store.as_ref(), parts.config.dimensions).await;

    for check in &checks {
        println!("{check}");
    }
    let failed = checks.iter().filter(|c| matches!(c.status, CheckStatus::Fail)).count();
    if failed > 0 {
        bail!("{failed} setup check(s) failed");
    }
    println!("\nSetup looks good.");
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Check {
    pub name: &'static str,
    pub status: CheckStatus,
    pub detail: String,
}

impl Check {
    fn new(name: &'static str, status: CheckStatus, detail: impl Into<String>) -> Self {
        Self { name, status, detail: detail.into() }
    }
}

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mark = match self.status {
            CheckStatus::Pass => "ok  ",
            CheckStatus::Warn => "warn",
            CheckStatus::Fail => "FAIL",
        };
        write!(f, "[{mark}] {}: {}", self.name, self.detail)
    }
}

/// Connection and row count, embedding length, then a search smoke test.
pub async fn run_checks(
    embedder: &dyn EmbeddingProvider,
    store: &dyn DocumentStore,
    dimensions: usize,
) -> Vec<Check> {
    let mut checks = Vec::new();

    match store.count().await {
        Ok(0) => checks.push(Check::new(
            "document store",
            CheckStatus::Warn,
            format!(
                "connected to {}, but it holds no documents; run `lex ingest`",
                store.backend()
            ),
        )),
        Ok(n) => checks.push(Check::new(
            "document store",
            CheckStatus::Pass,
            format!("connected to {}, {n} documents", store.backend()),
        )),
        Err(e) => {
            checks.push(Check::new("document store", CheckStatus::Fail, e.to_string()));
            return checks;
        }
    }

    let vector = match embedder.embed_with_source(VERIFY_QUERY).await {
        Ok(outcome) if outcome.vector.len() != dimensions => {
            checks.push(Check::new(
                "embedding",
                CheckStatus::Fail,
                format!(
                    "{} returned {} dimensions, expected {dimensions}",
                    outcome.provider,
                    outcome.vector.len()
                ),
            ));
            return checks;
        }
        Ok(outcome) if outcome.synthetic => {
            warn!("verification query used the hash fallback");
            checks.push(Check::new(
                "embedding",
                CheckStatus::Warn,
                format!(
                    "{dimensions} dimensions, but from the hash fallback; no provider answered"
                ),
            ));
            outcome.vector
        }
        Ok(outcome) => {
            checks.push(Check::new(
                "embedding",
                CheckStatus::Pass,
                format!("{dimensions} dimensions from {}", outcome.provider),
            ));
            outcome.vector
        }
        Err(e) => {
            checks.push(Check::new("embedding", CheckStatus::Fail, e.to_string()));
            return checks;
        }
    };

    match store.match_documents(&vector, 3).await {
        Ok(matches) if matches.is_empty() => checks.push(Check::new(
            "vector search",
            CheckStatus::Warn,
            "search ran but returned no matches",
        )),
        Ok(matches) => {
            let top = &matches[0];
            info!(matches = matches.len(), top = %top.title, "verification search finished");
            checks.push(Check::new(
                "vector search",
                CheckStatus::Pass,
                format!("{} matches, top: {} ({:.3})", matches.len(), top.title, top.similarity),
            ));
        }
        Err(e) => checks.push(Check::new("vector search", CheckStatus::Fail, e.to_string())),
    }

    checks
}
