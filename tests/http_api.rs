//! Integration tests for the HTTP surface.
//!
//! These tests verify the router wiring end to end with the bundled catalog
//! and the scripted generation service:
//! 1. Catalog endpoints rank and filter
//! 2. Session endpoints run turns on background tasks
//! 3. The event stream reports turn progress
//! 4. Errors map to the expected status codes

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use futures::StreamExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use persona_advisor::adapters::ai::MockGenerationService;
use persona_advisor::adapters::catalog::YamlCatalog;
use persona_advisor::adapters::http::{router, AppState};
use persona_advisor::application::{SessionDefaults, TurnDriver};

// =============================================================================
// Test Infrastructure
// =============================================================================

fn app(service: MockGenerationService) -> Router {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("catalog/catalog.yaml");
    let catalog = Arc::new(YamlCatalog::load(path).unwrap());
    let state = AppState::new(
        catalog,
        TurnDriver::new(Arc::new(service)),
        SessionDefaults::default(),
        3,
    );
    router(state)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn create_session(app: &Router, body: Value) -> String {
    let (status, session) = send(app, "POST", "/api/sessions", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED, "{session}");
    session["id"].as_str().unwrap().to_string()
}

/// Polls the session until no turn is in flight.
async fn settled_session(app: &Router, id: &str) -> Value {
    for _ in 0..200 {
        let (_, session) = send(app, "GET", &format!("/api/sessions/{id}"), None).await;
        if session["in_flight"] == json!(false) {
            return session;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("turn did not finish");
}

fn message_texts(session: &Value) -> Vec<&str> {
    session["messages"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["content"].as_str().unwrap())
        .collect()
}

// =============================================================================
// Catalog endpoints
// =============================================================================

#[tokio::test]
async fn health_reports_ok() {
    let (status, body) = send(&app(MockGenerationService::new()), "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn schools_rank_for_profile() {
    let app = app(MockGenerationService::new());
    let (status, body) = send(&app, "GET", "/api/schools?code=INFJ&category=hades", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["recommended"][0]["id"], "hades");
    assert_eq!(body["recommended"][0]["score"], 20);
    assert_eq!(body["recommended"][0]["reason"], "dominant_category");
    assert_eq!(body["other"][0]["id"], "athena");
}

#[tokio::test]
async fn personas_honour_school_and_max() {
    let app = app(MockGenerationService::new());
    let (status, body) = send(
        &app,
        "GET",
        "/api/personas?school=hades&code=INFJ&category=hades&max=1",
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["recommended"].as_array().unwrap().len(), 1);
    assert_eq!(body["recommended"][0]["id"], "jung");
    assert_eq!(body["other"][0]["id"], "freud");
}

#[tokio::test]
async fn school_detail_lists_concepts_and_personas() {
    let app = app(MockGenerationService::new());
    let (status, body) = send(&app, "GET", "/api/schools/hades", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["concepts"][1]["type"], "interactive");
    assert_eq!(body["personas"]["other"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn unknown_school_is_404() {
    let app = app(MockGenerationService::new());
    let (status, body) = send(&app, "GET", "/api/schools/zeus", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error_code"], "CATEGORY_NOT_FOUND");
}

#[tokio::test]
async fn half_a_profile_is_400() {
    let app = app(MockGenerationService::new());
    let (status, _) = send(&app, "GET", "/api/personas?code=INFJ", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// =============================================================================
// Session endpoints
// =============================================================================

#[tokio::test]
async fn message_turn_settles_with_suggestions() {
    let service = MockGenerationService::new()
        .with_fragments(["Try this.", "[SUGGESTION]Tell me more[/SUGGESTION]"]);
    let app = app(service);
    let id = create_session(&app, json!({ "persona_id": "jung" })).await;

    let (status, accepted) = send(
        &app,
        "POST",
        &format!("/api/sessions/{id}/messages"),
        Some(json!({ "text": "Hello" })),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert!(accepted["turn_id"].is_string());

    let session = settled_session(&app, &id).await;
    assert_eq!(
        message_texts(&session),
        vec![
            "Welcome. Shall we see what your unconscious has to say today?",
            "Hello",
            "Try this."
        ]
    );
    assert_eq!(session["suggestions"], json!(["Tell me more"]));
    assert_eq!(session["state"], "settled");
}

#[tokio::test]
async fn interactive_concept_auto_starts() {
    let service = MockGenerationService::new().with_fragments(["Dreams speak in symbols."]);
    let app = app(service.clone());
    let id = create_session(&app, json!({ "school_id": "hades", "concept_index": 1 })).await;

    let session = settled_session(&app, &id).await;
    assert_eq!(
        message_texts(&session),
        vec![
            "Let's look at one of your dreams together.",
            "What might my recurring dreams be telling me?",
            "Dreams speak in symbols."
        ]
    );
    assert_eq!(service.call_count(), 1);
}

#[tokio::test]
async fn second_message_while_in_flight_is_409() {
    let service = MockGenerationService::new()
        .with_fragments(["slow ", "reply"])
        .with_fragment_delay(Duration::from_millis(200));
    let app = app(service);
    let id = create_session(&app, json!({})).await;
    let uri = format!("/api/sessions/{id}/messages");

    let (first, _) = send(&app, "POST", &uri, Some(json!({ "text": "one" }))).await;
    let (second, body) = send(&app, "POST", &uri, Some(json!({ "text": "two" }))).await;

    assert_eq!(first, StatusCode::ACCEPTED);
    assert_eq!(second, StatusCode::CONFLICT);
    assert_eq!(body["error_code"], "TURN_IN_FLIGHT");
}

#[tokio::test]
async fn blank_message_is_400() {
    let app = app(MockGenerationService::new());
    let id = create_session(&app, json!({})).await;
    let (status, body) = send(
        &app,
        "POST",
        &format!("/api/sessions/{id}/messages"),
        Some(json!({ "text": "   " })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_code"], "EMPTY_FIELD");
}

#[tokio::test]
async fn cancel_replaces_partial_reply() {
    let service = MockGenerationService::new()
        .with_fragments(["a", "b", "c"])
        .with_fragment_delay(Duration::from_millis(200));
    let app = app(service);
    let id = create_session(&app, json!({})).await;

    send(&app, "POST", &format!("/api/sessions/{id}/messages"), Some(json!({ "text": "go" }))).await;
    let (status, body) = send(&app, "DELETE", &format!("/api/sessions/{id}/turn"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cancelled"], true);

    let session = settled_session(&app, &id).await;
    assert_eq!(session["state"], "idle");
    assert_eq!(
        message_texts(&session).last().copied(),
        Some("(This answer was cancelled.)")
    );
}

#[tokio::test]
async fn events_stream_reports_turn_progress() {
    let service = MockGenerationService::new().with_fragments(["Hel", "lo"]);
    let app = app(service);
    let id = create_session(&app, json!({})).await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(format!("/api/sessions/{id}/events"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let mut frames = response.into_body().into_data_stream();

    send(&app, "POST", &format!("/api/sessions/{id}/messages"), Some(json!({ "text": "hi" }))).await;

    let mut received = String::new();
    while !received.contains("event: settled") {
        let chunk = tokio::time::timeout(Duration::from_secs(2), frames.next())
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        received.push_str(std::str::from_utf8(&chunk).unwrap());
    }

    assert!(received.contains("event: turn_started"));
    assert!(received.contains("event: fragment"));
    assert!(received.contains(r#""text":"Hello""#));
}

#[tokio::test]
async fn closed_session_is_gone() {
    let app = app(MockGenerationService::new());
    let id = create_session(&app, json!({})).await;

    let (status, _) = send(&app, "DELETE", &format!("/api/sessions/{id}"), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, "GET", &format!("/api/sessions/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error_code"], "SESSION_NOT_FOUND");
}

#[tokio::test]
async fn malformed_session_id_is_400() {
    let app = app(MockGenerationService::new());
    let (status, body) = send(&app, "GET", "/api/sessions/not-a-uuid", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_code"], "INVALID_FORMAT");
}

#[tokio::test]
async fn unknown_persona_is_404() {
    let app = app(MockGenerationService::new());
    let (status, body) = send(&app, "POST", "/api/sessions", Some(json!({ "persona_id": "nobody" }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error_code"], "PERSONA_NOT_FOUND");
}

#[tokio::test]
async fn zero_max_is_400() {
    let app = app(MockGenerationService::new());
    let (status, body) = send(&app, "GET", "/api/schools?max=0", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_code"], "VALIDATION_FAILED");
}
