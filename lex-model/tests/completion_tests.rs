//! Completion providers against loopback stand-ins for Groq and Hugging Face.

use std::sync::{Arc, Mutex};

use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use lex_core::{CompletionProvider, LexError, Message};
use lex_model::fallback::ALL_PROVIDERS_FAILED;
use lex_model::{FallbackCompletion, GroqClient, GroqConfig, HuggingFaceTextGeneration};
use serde_json::{Value, json};

#[derive(Clone)]
struct Upstream {
    status: StatusCode,
    reply: Value,
    requests: Arc<Mutex<Vec<Value>>>,
}

async fn respond(
    State(upstream): State<Upstream>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    upstream.requests.lock().unwrap().push(body);
    (upstream.status, Json(upstream.reply.clone()))
}

async fn spawn_upstream(status: StatusCode, reply: Value) -> (String, Arc<Mutex<Vec<Value>>>) {
    let requests = Arc::new(Mutex::new(Vec::new()));
    let state = Upstream { status, reply, requests: requests.clone() };
    let app = Router::new()
        .route("/v1/chat/completions", post(respond))
        .route("/models/phi3", post(respond))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind test listener");
    let addr = listener.local_addr().expect("listener addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server run");
    });
    (format!("http://{addr}"), requests)
}

fn groq(base: &str) -> GroqClient {
    GroqClient::new(GroqConfig::new("gsk_test").with_base_url(format!("{base}/v1"))).unwrap()
}

fn huggingface(base: &str) -> HuggingFaceTextGeneration {
    HuggingFaceTextGeneration::new().with_endpoint(format!("{base}/models/phi3"))
}

fn question() -> Vec<Message> {
    vec![Message::user("Context:\n[ARTICLE] RICO\nbody\n\nQuestion: What is RICO?\n\nAnswer:")]
}

#[tokio::test]
async fn groq_sends_system_prompt_and_sampling_settings() {
    let reply = json!({
        "choices": [{"message": {"role": "assistant", "content": "RICO is a federal law."}}]
    });
    let (base, requests) = spawn_upstream(StatusCode::OK, reply).await;

    let answer = groq(&base).complete("Answer only from context.", &question()).await.unwrap();
    assert_eq!(answer, "RICO is a federal law.");

    let sent = requests.lock().unwrap()[0].clone();
    assert_eq!(sent["model"], "llama-3.1-8b-instant");
    assert_eq!(sent["max_tokens"], 1000);
    assert!((sent["temperature"].as_f64().unwrap() - 0.3).abs() < 1e-6);
    assert_eq!(
        sent["messages"][0],
        json!({"role": "system", "content": "Answer only from context."})
    );
    assert_eq!(sent["messages"][1]["role"], "user");
}

#[tokio::test]
async fn groq_empty_choices_answer_i_do_not_know() {
    let (base, _) = spawn_upstream(StatusCode::OK, json!({"choices": []})).await;
    let answer = groq(&base).complete("s", &question()).await.unwrap();
    assert_eq!(answer, "I do not know.");
}

#[tokio::test]
async fn groq_error_status_is_classified() {
    let reply = json!({"error": {"message": "rate limited"}});
    let (base, _) = spawn_upstream(StatusCode::TOO_MANY_REQUESTS, reply).await;
    let err = groq(&base).complete("s", &question()).await.unwrap_err();
    match err {
        LexError::Upstream(e) => {
            assert_eq!(e.status, Some(429));
            assert_eq!(e.message, "rate limited");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn huggingface_formats_phi3_prompt() {
    let reply = json!([{"generated_text": " RICO targets racketeering. "}]);
    let (base, requests) = spawn_upstream(StatusCode::OK, reply).await;

    let answer = huggingface(&base).complete("sys", &question()).await.unwrap();
    assert_eq!(answer, "RICO targets racketeering.");

    let sent = requests.lock().unwrap()[0].clone();
    let inputs = sent["inputs"].as_str().unwrap();
    assert!(inputs.starts_with("<|system|>\nsys<|end|>\n<|user|>\nContext:"));
    assert!(inputs.ends_with("<|assistant|>\n"));
    assert_eq!(sent["parameters"]["max_new_tokens"], 1000);
}

#[tokio::test]
async fn primary_failure_falls_back_to_secondary() {
    let rejected = json!({"error": {"message": "invalid key"}});
    let (groq_base, groq_requests) = spawn_upstream(StatusCode::UNAUTHORIZED, rejected).await;
    let (hf_base, hf_requests) =
        spawn_upstream(StatusCode::OK, json!({"generated_text": "from the fallback"})).await;

    let providers: Vec<Arc<dyn CompletionProvider>> =
        vec![Arc::new(groq(&groq_base)), Arc::new(huggingface(&hf_base))];
    let chain = FallbackCompletion::new(providers);
    let answer = chain.complete("s", &question()).await.unwrap();

    assert_eq!(answer, "from the fallback");
    assert_eq!(groq_requests.lock().unwrap().len(), 1);
    assert_eq!(hf_requests.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn exhausted_chain_reports_generic_failure() {
    let (groq_base, _) = spawn_upstream(StatusCode::INTERNAL_SERVER_ERROR, json!({})).await;
    let (hf_base, _) =
        spawn_upstream(StatusCode::SERVICE_UNAVAILABLE, json!({"error": "loading"})).await;

    let providers: Vec<Arc<dyn CompletionProvider>> =
        vec![Arc::new(groq(&groq_base)), Arc::new(huggingface(&hf_base))];
    let chain = FallbackCompletion::new(providers);
    let err = chain.complete("s", &question()).await.unwrap_err();
    assert_eq!(err.to_string(), ALL_PROVIDERS_FAILED);
}
