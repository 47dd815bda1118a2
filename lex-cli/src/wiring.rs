//! Builds providers, the document store and the pipeline from [`Settings`].

use std::sync::Arc;

use anyhow::{Context, Result, bail};
use lex_core::CompletionProvider;
use lex_model::{FallbackCompletion, GroqClient, GroqConfig, HuggingFaceTextGeneration};
use lex_rag::{
    AnswerPipeline, CohereEmbeddingProvider, DocumentStore, EmbeddingProvider, FallbackEmbedder,
    HuggingFaceEmbeddingProvider, InMemoryDocumentStore, RagConfig, SupabaseStore,
    TogetherEmbeddingProvider,
};
use tracing::{info, warn};

use crate::settings::Settings;

pub fn rag_config(settings: &Settings) -> Result<RagConfig> {
    RagConfig::builder()
        .model_loading_delay(settings.model_loading_delay)
        .build()
        .context("invalid retrieval configuration")
}

/// Together → Cohere → Hugging Face, each keyed provider only when its key is set.
pub fn embedder(settings: &Settings, config: &RagConfig) -> Result<FallbackEmbedder> {
    let mut builder = FallbackEmbedder::builder().config(config);

    match &settings.together_api_key {
        Some(key) => {
            let provider = TogetherEmbeddingProvider::new(key.as_str())?
                .with_dimensions(config.dimensions)
                .with_timeout(settings.http_timeout);
            builder = builder.provider(Arc::new(provider));
        }
        None => info!("TOGETHER_API_KEY not set, skipping Together embeddings"),
    }

    match &settings.cohere_api_key {
        Some(key) => {
            let provider = CohereEmbeddingProvider::new(key.as_str())?
                .with_dimensions(config.dimensions)
                .with_timeout(settings.http_timeout);
            builder = builder.provider(Arc::new(provider));
        }
        None => info!("COHERE_API_KEY not set, skipping Cohere embeddings"),
    }

    let mut huggingface = HuggingFaceEmbeddingProvider::new()
        .with_model_loading_delay(config.model_loading_delay)
        .with_timeout(settings.http_timeout);
    if let Some(token) = &settings.hf_api_token {
        huggingface = huggingface.with_api_token(token.as_str());
    }

    Ok(builder.provider(Arc::new(huggingface)).build())
}

/// Groq (when keyed) then the keyless Phi-3 endpoint.
pub fn completion(settings: &Settings) -> Result<FallbackCompletion> {
    let mut providers: Vec<Arc<dyn CompletionProvider>> = Vec::new();

    match &settings.groq_api_key {
        Some(key) => {
            let config = GroqConfig::new(key.as_str()).with_timeout(settings.http_timeout);
            let client = GroqClient::new(config)?;
            providers.push(Arc::new(client));
        }
        None => warn!("GROQ_API_KEY not set, answers come from the Hugging Face fallback only"),
    }

    let mut phi3 = HuggingFaceTextGeneration::new().with_timeout(settings.http_timeout);
    if let Some(token) = &settings.hf_api_token {
        phi3 = phi3.with_api_token(token.as_str());
    }
    providers.push(Arc::new(phi3));

    Ok(FallbackCompletion::new(providers))
}

/// Pick the document store: in-memory when asked, pgvector when built with
/// that feature and `DATABASE_URL` is set, otherwise Supabase.
pub async fn store(settings: &Settings, memory: bool) -> Result<Arc<dyn DocumentStore>> {
    if memory {
        info!("using in-memory document store");
        return Ok(Arc::new(InMemoryDocumentStore::new()));
    }

    if let Some(store) = pgvector_store(settings).await? {
        return Ok(store);
    }

    let (Some(url), Some(key)) = (&settings.supabase_url, &settings.supabase_service_role_key)
    else {
        bail!("SUPABASE_URL and SUPABASE_SERVICE_ROLE_KEY must be set (or pass --memory)");
    };
    let store = SupabaseStore::new(url.as_str(), key.as_str())?.with_timeout(settings.http_timeout);
    info!(url = %store.base_url(), "using Supabase document store");
    Ok(Arc::new(store))
}

#[cfg(feature = "pgvector")]
async fn pgvector_store(settings: &Settings) -> Result<Option<Arc<dyn DocumentStore>>> {
    let Some(url) = &settings.database_url else { return Ok(None) };
    let store =
        lex_rag::PgVectorStore::new(url).await.context("failed to connect to DATABASE_URL")?;
    let store: Arc<dyn DocumentStore> = Arc::new(store);
    info!("using pgvector document store");
    Ok(Some(store))
}

#[cfg(not(feature = "pgvector"))]
async fn pgvector_store(settings: &Settings) -> Result<Option<Arc<dyn DocumentStore>>> {
    if settings.database_url.is_some() {
        warn!("DATABASE_URL is set but this build lacks the pgvector feature; using Supabase");
    }
    Ok(None)
}

pub struct Components {
    pub config: RagConfig,
    pub embedder: Arc<dyn EmbeddingProvider>,
    pub store: Arc<dyn DocumentStore>,
    pub pipeline: Arc<AnswerPipeline>,
}

pub async fn components(settings: &Settings, memory: bool) -> Result<Components> {
    let config = rag_config(settings)?;
    let embedder: Arc<dyn EmbeddingProvider> = Arc::new(embedder(settings, &config)?);
    let store = store(settings, memory).await?;
    let pipeline = AnswerPipeline::builder()
        .config(config.clone())
        .embedder(embedder.clone())
        .store(store.clone())
        .completion(Arc::new(completion(settings)?))
        .build()?;

    Ok(Components { config, embedder, store, pipeline: Arc::new(pipeline) })
}
