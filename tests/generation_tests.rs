use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};

use wortschatz_trainer::services::generator::{GenerationError, LlmSentenceGenerator, SentenceGenerator};
use wortschatz_trainer::services::llm_provider::{LLMConfig, LLMError, LLMProvider};
use wortschatz_trainer::services::session::SessionPhase;
use wortschatz_trainer::services::trainer::{Action, OutcomeCode, Trainer};

mod common;

use common::{day, seeded_store};

#[derive(Clone)]
struct FakeService {
    status: StatusCode,
    body: Value,
    requests: Arc<Mutex<Vec<(Option<String>, Value)>>>,
}

async fn completions(
    State(service): State<FakeService>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    service.requests.lock().unwrap().push((auth, body));
    (service.status, Json(service.body.clone())).into_response()
}

async fn spawn_service(status: StatusCode, body: Value) -> (LLMProvider, FakeService) {
    let service = FakeService {
        status,
        body,
        requests: Arc::new(Mutex::new(Vec::new())),
    };
    let app = Router::new()
        .route("/v1/chat/completions", post(completions))
        .with_state(service.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr: SocketAddr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let provider = LLMProvider::new(LLMConfig::new("test-key", format!("http://{addr}")));
    (provider, service)
}

fn content_body(content: &str) -> Value {
    json!({
        "model": "google/gemini-pro",
        "choices": [{ "message": { "role": "assistant", "content": content } }]
    })
}

#[tokio::test]
async fn test_examples_request_shape_and_parsing() {
    let (provider, service) = spawn_service(
        StatusCode::OK,
        content_body("Дом стоит у реки.\n\nМой дом большой.\n  \nЭто новый дом.\n"),
    )
    .await;
    let generator = LlmSentenceGenerator::new(provider);

    let sentences = generator.generate_examples("Haus", 10).await.unwrap();
    assert_eq!(sentences, vec!["Дом стоит у реки.", "Мой дом большой.", "Это новый дом."]);

    let requests = service.requests.lock().unwrap();
    assert_eq!(requests.len(), 1);
    let (auth, body) = &requests[0];
    assert_eq!(auth.as_deref(), Some("Bearer test-key"));
    assert_eq!(body["model"], "google/gemini-pro");
    assert_eq!(body["messages"][0]["role"], "user");
    let prompt = body["messages"][0]["content"].as_str().unwrap();
    assert!(prompt.contains("'Haus'"));
}

#[tokio::test]
async fn test_examples_without_content_field_fail() {
    let (provider, _service) = spawn_service(
        StatusCode::OK,
        json!({ "error": { "message": "No auth credentials found", "code": 401 } }),
    )
    .await;
    let generator = LlmSentenceGenerator::new(provider);

    let err = generator.generate_examples("Haus", 10).await.unwrap_err();
    assert!(matches!(err, GenerationError::Examples(LLMError::MissingContent)));
}

#[tokio::test]
async fn test_blank_examples_fail() {
    let (provider, _service) = spawn_service(StatusCode::OK, content_body("\n   \n")).await;
    let generator = LlmSentenceGenerator::new(provider);

    let err = generator.generate_examples("Haus", 10).await.unwrap_err();
    assert!(matches!(err, GenerationError::NoSentences));
}

#[tokio::test]
async fn test_translation_is_trimmed() {
    let (provider, service) = spawn_service(StatusCode::OK, content_body("  Das Haus steht am Fluss.\n")).await;
    let generator = LlmSentenceGenerator::new(provider);

    let translation = generator.translate("Дом стоит у реки.", "Haus").await.unwrap();
    assert_eq!(translation, "Das Haus steht am Fluss.");

    let requests = service.requests.lock().unwrap();
    let prompt = requests[0].1["messages"][0]["content"].as_str().unwrap();
    assert!(prompt.contains("'Дом стоит у реки.'"));
}

#[tokio::test]
async fn test_translation_without_content_field_fails() {
    let (provider, _service) = spawn_service(StatusCode::OK, json!({ "choices": [] })).await;
    let generator = LlmSentenceGenerator::new(provider);

    let err = generator.translate("Дом стоит у реки.", "Haus").await.unwrap_err();
    assert!(matches!(err, GenerationError::Translation(LLMError::MissingContent)));
}

#[tokio::test]
async fn test_server_error_is_sent_once() {
    let (provider, service) =
        spawn_service(StatusCode::SERVICE_UNAVAILABLE, json!({ "error": "overloaded" })).await;
    let generator = LlmSentenceGenerator::new(provider);

    let err = generator.generate_examples("Haus", 10).await.unwrap_err();
    assert!(matches!(
        err,
        GenerationError::Examples(LLMError::HttpStatus { status, .. }) if status == reqwest::StatusCode::SERVICE_UNAVAILABLE
    ));
    assert_eq!(service.requests.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_client_error_status_is_sent_once() {
    let (provider, service) = spawn_service(StatusCode::BAD_REQUEST, json!({ "error": "bad model" })).await;
    let generator = LlmSentenceGenerator::new(provider);

    let err = generator.translate("Дом.", "Haus").await.unwrap_err();
    assert!(matches!(
        err,
        GenerationError::Translation(LLMError::HttpStatus { status, .. }) if status == reqwest::StatusCode::BAD_REQUEST
    ));
    assert_eq!(service.requests.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_session_stays_idle_when_service_omits_content() {
    let (provider, _service) = spawn_service(StatusCode::OK, json!({ "id": "gen-1" })).await;
    let dir = tempfile::tempdir().unwrap();
    let store = seeded_store(&dir.path().join("words.csv"), &[("Haus", 0, "05.03.2024")]);
    let mut trainer = Trainer::new(store, Arc::new(LlmSentenceGenerator::new(provider)));

    let outcome = trainer.dispatch_on(Action::StartSession, day(2024, 3, 15)).await;

    assert_eq!(outcome.code, OutcomeCode::ExternalService);
    assert_eq!(trainer.session().phase(), SessionPhase::Idle);
    assert!(trainer.session().active().is_none());
}
