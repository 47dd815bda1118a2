use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use lex_core::{CompletionProvider, Message, UpstreamError};
use lex_model::MockCompletion;
use lex_rag::{
    AnswerPipeline, DocumentKind, DocumentStore, EmbeddingProvider, HashEmbeddingProvider,
    InMemoryDocumentStore, NO_MATCH_ANSWER, NewDocument, RagConfig, hash_embedding,
};
use lex_server::{AppState, app_router};
use serde_json::{Value, json};

const RICO_QUESTION: &str = "What is RICO?";

/// Always fails with the given upstream status.
struct RejectingEmbedder(u16);

#[async_trait]
impl EmbeddingProvider for RejectingEmbedder {
    fn name(&self) -> &str {
        "rejecting"
    }

    async fn embed(&self, _text: &str) -> lex_rag::Result<Vec<f32>> {
        Err(UpstreamError::status("Together", self.0, "rejected").into())
    }

    fn dimensions(&self) -> usize {
        1536
    }
}

/// Answers after a delay.
struct SlowCompletion(Duration);

#[async_trait]
impl CompletionProvider for SlowCompletion {
    fn name(&self) -> &str {
        "slow"
    }

    async fn complete(
        &self,
        _system_prompt: &str,
        _messages: &[Message],
    ) -> lex_core::Result<String> {
        tokio::time::sleep(self.0).await;
        Ok("late".to_string())
    }
}

/// A store holding one RICO article whose embedding equals the question's,
/// so it matches with similarity 1.
async fn rico_store() -> Arc<InMemoryDocumentStore> {
    let store = Arc::new(InMemoryDocumentStore::new());
    store
        .insert(NewDocument {
            title: "Understanding RICO: A Guide to Federal Racketeering Laws".into(),
            content: "RICO is a federal law designed to combat organized crime.".into(),
            kind: DocumentKind::Article,
            embedding: hash_embedding(RICO_QUESTION, 1536),
        })
        .await
        .expect("seed document");
    store
}

fn state(
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn DocumentStore>,
    completion: Arc<dyn CompletionProvider>,
) -> AppState {
    let pipeline = AnswerPipeline::builder()
        .config(RagConfig::builder().match_count(1).build().expect("config"))
        .embedder(embedder)
        .store(store)
        .completion(completion)
        .build()
        .expect("pipeline");
    AppState::new(Arc::new(pipeline))
}

async fn default_state() -> AppState {
    state(
        Arc::new(HashEmbeddingProvider::default()),
        rico_store().await,
        Arc::new(MockCompletion::answering("RICO targets organized crime.")),
    )
}

async fn spawn_server(state: AppState) -> (String, tokio::task::JoinHandle<()>) {
    let app = app_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind test listener");
    let addr = listener.local_addr().expect("listener addr");

    let handle = tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server run");
    });

    (format!("http://{}", addr), handle)
}

async fn post_ask(base: &str, body: impl Into<reqwest::Body>) -> (u16, Value) {
    let response = reqwest::Client::new()
        .post(format!("{}/ask", base))
        .header("content-type", "application/json")
        .body(body)
        .send()
        .await
        .expect("ask response");
    let status = response.status().as_u16();
    (status, response.json().await.expect("json body"))
}

#[tokio::test]
async fn health_reports_service_name() {
    let (base, handle) = spawn_server(default_state().await).await;

    let response = reqwest::get(format!("{}/health", base)).await.expect("health");
    let body: Value = response.json().await.expect("json");
    assert_eq!(body, json!({"status": "ok", "service": "lex-server"}));

    handle.abort();
}

#[tokio::test]
async fn ask_returns_answer_and_sources() {
    let (base, handle) = spawn_server(default_state().await).await;

    let (status, body) = post_ask(&base, json!({"question": RICO_QUESTION}).to_string()).await;
    assert_eq!(status, 200);
    assert_eq!(body["answer"], "RICO targets organized crime.");

    let sources = body["sources"].as_array().expect("sources array");
    assert_eq!(sources.len(), 1);
    assert_eq!(sources[0]["type"], "article");
    assert_eq!(sources[0]["title"], "Understanding RICO: A Guide to Federal Racketeering Laws");
    assert!(sources[0]["id"].is_string());
    assert!((sources[0]["similarity"].as_f64().expect("similarity") - 1.0).abs() < 1e-4);

    handle.abort();
}

#[tokio::test]
async fn missing_or_blank_question_is_400() {
    let (base, handle) = spawn_server(default_state().await).await;

    let invalid =
        [r#"{"question":""}"#, r#"{"question":"  "}"#, r#"{"question":7}"#, "{}", "{not json"];
    for body in invalid {
        let (status, json_body) = post_ask(&base, body).await;
        assert_eq!(status, 400, "{body}");
        assert_eq!(json_body, json!({"error": "Question is required"}));
    }

    handle.abort();
}

#[tokio::test]
async fn empty_store_gets_the_canned_answer() {
    let app_state = state(
        Arc::new(HashEmbeddingProvider::default()),
        Arc::new(InMemoryDocumentStore::new()),
        Arc::new(MockCompletion::answering("unused")),
    );
    let (base, handle) = spawn_server(app_state).await;

    let (status, body) = post_ask(&base, json!({"question": RICO_QUESTION}).to_string()).await;
    assert_eq!(status, 200);
    assert_eq!(body, json!({"answer": NO_MATCH_ANSWER, "sources": []}));

    handle.abort();
}

#[tokio::test]
async fn upstream_quota_and_auth_statuses_surface() {
    for (upstream, expected) in [(429u16, "quota exceeded"), (401, "authentication failed")] {
        let app_state = state(
            Arc::new(RejectingEmbedder(upstream)),
            rico_store().await,
            Arc::new(MockCompletion::answering("unused")),
        );
        let (base, handle) = spawn_server(app_state).await;

        let (status, body) = post_ask(&base, json!({"question": RICO_QUESTION}).to_string()).await;
        assert_eq!(status, upstream);
        assert!(body["error"].as_str().expect("error string").contains(expected));

        handle.abort();
    }
}

#[tokio::test]
async fn completion_failure_is_500() {
    let app_state = state(
        Arc::new(HashEmbeddingProvider::default()),
        rico_store().await,
        Arc::new(MockCompletion::failing(503)),
    );
    let (base, handle) = spawn_server(app_state).await;

    let (status, body) = post_ask(&base, json!({"question": RICO_QUESTION}).to_string()).await;
    assert_eq!(status, 500);
    assert_eq!(body, json!({"error": "Failed to generate response. Please try again."}));

    handle.abort();
}

#[tokio::test]
async fn slow_requests_hit_the_deadline() {
    let app_state = state(
        Arc::new(HashEmbeddingProvider::default()),
        rico_store().await,
        Arc::new(SlowCompletion(Duration::from_secs(5))),
    )
    .with_request_timeout(Duration::from_millis(50));
    let (base, handle) = spawn_server(app_state).await;

    let (status, body) = post_ask(&base, json!({"question": RICO_QUESTION}).to_string()).await;
    assert_eq!(status, 504);
    assert_eq!(body, json!({"error": "Request timed out"}));

    handle.abort();
}
