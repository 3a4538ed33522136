//! Integration tests for the loan service HTTP client.
//!
//! Each test starts a small axum app on an ephemeral port that answers the
//! way the loan service does.

// Allow unwrap and panic in tests - these are standard for test code
#![allow(clippy::unwrap_used, clippy::panic)]

use axum::Json;
use axum::Router;
use axum::extract::{Multipart, Path, Query};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use loanchat::{ClientError, LoanApi, LoanApiClient, save_letter};
use loanchat_core::{ChatRequest, InputType, sanction_file_name};
use serde_json::{Value, json};
use std::collections::HashMap;

// =============================================================================
// MOCK SERVICE
// =============================================================================

async fn start() -> Json<Value> {
    Json(json!({
        "session_id": "s-1",
        "message": "Hello! I'm your loan assistant.",
        "stage": "greeting"
    }))
}

async fn chat(Json(body): Json<ChatRequest>) -> Json<Value> {
    if body.message == "upload" {
        return Json(json!({
            "session_id": body.session_id,
            "message": "Please upload your salary slip.",
            "stage": "salary_slip_upload",
            "requires_input": true,
            "input_type": "file",
            "metadata": { "required_document": "salary_slip" }
        }));
    }
    Json(json!({
        "session_id": body.session_id,
        "message": format!("You said: {}", body.message),
        "stage": "offer_presentation",
        "requires_input": true,
        "input_type": null,
        "choices": ["Yes", "No"]
    }))
}

async fn session(Path(id): Path<String>) -> Result<Json<Value>, (StatusCode, String)> {
    if id != "s-1" {
        return Err((StatusCode::NOT_FOUND, "Session not found".into()));
    }
    Ok(Json(json!({
        "session_id": "s-1",
        "stage": "underwriting",
        "customer": { "name": "Priya Sharma", "kyc_status": "verified", "credit_score": 780 },
        "application": { "requested_amount": 500000.0, "requested_tenure": 36, "interest_rate": 10.5 },
        "conversation_history": [
            { "role": "assistant", "content": "Hello!" },
            { "role": "user", "content": "I need a loan" }
        ]
    })))
}

async fn upload(
    Query(query): Query<HashMap<String, String>>,
    mut multipart: Multipart,
) -> Json<Value> {
    let mut file_name = String::new();
    let mut content_type = String::new();
    let mut size = 0;
    while let Some(field) = multipart.next_field().await.unwrap() {
        if field.name() == Some("file") {
            file_name = field.file_name().unwrap_or_default().to_string();
            content_type = field.content_type().unwrap_or_default().to_string();
            size = field.bytes().await.unwrap().len();
        }
    }
    Json(json!({
        "success": true,
        "message": format!("{file_name} {content_type} {size} for {}", query["session_id"]),
        "stage": "underwriting",
        "parsed_salary": 85000.0
    }))
}

async fn generate(Path(id): Path<String>) -> Result<Vec<u8>, (StatusCode, String)> {
    if id == "pending" {
        return Err((StatusCode::BAD_REQUEST, "Loan not approved yet".into()));
    }
    Ok(b"%PDF-1.4 letter".to_vec())
}

async fn download(Path(id): Path<String>) -> Vec<u8> {
    format!("%PDF-1.4 {id}").into_bytes()
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy", "service": "loan-chatbot-api" }))
}

async fn secret(headers: HeaderMap) -> Result<Json<Value>, StatusCode> {
    match headers.get("authorization").and_then(|v| v.to_str().ok()) {
        Some("Bearer sk-test") => Ok(Json(json!({ "status": "ok" }))),
        _ => Err(StatusCode::UNAUTHORIZED),
    }
}

async fn broken() -> (StatusCode, &'static str) {
    (StatusCode::INTERNAL_SERVER_ERROR, "boom")
}

async fn garbage() -> &'static str {
    "not json"
}

fn mock_service() -> Router {
    Router::new()
        .route("/api/chat/start", post(start))
        .route("/api/chat", post(chat))
        .route("/api/session/{id}", get(session))
        .route("/api/upload", post(upload))
        .route("/api/sanction/generate/{id}", get(generate))
        .route("/api/sanction/download/{id}", get(download))
        .route("/api/health", get(health))
        .nest(
            "/secure",
            Router::new().route("/api/health", get(secret)),
        )
        .nest("/broken", Router::new().route("/api/chat/start", post(broken)))
        .nest("/garbage", Router::new().route("/api/chat/start", post(garbage)))
}

/// Serve the mock on an ephemeral port and return its base URL.
async fn spawn_service() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, mock_service()).await.unwrap();
    });
    format!("http://{addr}")
}

// =============================================================================
// HAPPY PATHS
// =============================================================================

#[tokio::test]
async fn test_start_session() {
    let client = LoanApiClient::new(spawn_service().await, None);
    let start = client.start_session().await.unwrap();
    assert_eq!(start.session_id, "s-1");
    assert_eq!(start.stage, "greeting");
}

#[tokio::test]
async fn test_send_message_null_input_type_is_text() {
    let client = LoanApiClient::new(spawn_service().await, None);
    let request = ChatRequest {
        session_id: "s-1".into(),
        message: "hi".into(),
    };
    let reply = client.send_message(&request).await.unwrap();
    assert_eq!(reply.message, "You said: hi");
    assert_eq!(reply.stage, "offer_presentation");
    assert_eq!(reply.input_type, InputType::Text);
    assert_eq!(reply.choices, Some(vec!["Yes".to_string(), "No".to_string()]));
}

#[tokio::test]
async fn test_send_message_file_request() {
    let client = LoanApiClient::new(spawn_service().await, None);
    let request = ChatRequest {
        session_id: "s-1".into(),
        message: "upload".into(),
    };
    let reply = client.send_message(&request).await.unwrap();
    assert_eq!(reply.input_type, InputType::File);
    let metadata = reply.metadata.unwrap();
    assert_eq!(metadata.get("required_document"), Some(&json!("salary_slip")));
    assert_eq!(metadata.sanction_id(), None);
}

#[tokio::test]
async fn test_fetch_session() {
    let client = LoanApiClient::new(spawn_service().await, None);
    let snapshot = client.fetch_session("s-1").await.unwrap();
    assert_eq!(snapshot.stage.as_deref(), Some("underwriting"));
    assert_eq!(snapshot.customer.unwrap().name, "Priya Sharma");
    let application = snapshot.application.unwrap();
    assert_eq!(application.requested_tenure, Some(36));
    assert!(!application.loan_approved);
    assert_eq!(snapshot.conversation_history.len(), 2);
}

#[tokio::test]
async fn test_upload_sends_multipart_pdf() {
    let client = LoanApiClient::new(spawn_service().await, None);
    let reply = client
        .upload_document("s-1", "slip.pdf", vec![0u8; 1024])
        .await
        .unwrap();
    assert!(reply.success);
    assert_eq!(reply.message, "slip.pdf application/pdf 1024 for s-1");
    assert_eq!(reply.stage.as_deref(), Some("underwriting"));
    assert_eq!(reply.parsed_salary, Some(85000.0));
}

#[tokio::test]
async fn test_sanction_letter_bytes() {
    let base = spawn_service().await;
    let client = LoanApiClient::new(format!("{base}/"), None);
    let pdf = client.fetch_sanction_letter("s-1").await.unwrap();
    assert!(pdf.starts_with(b"%PDF"));

    let pdf = client.download_sanction("SL-42").await.unwrap();
    assert_eq!(pdf, b"%PDF-1.4 SL-42".to_vec());
}

#[tokio::test]
async fn test_issued_letter_saved_under_its_id() {
    let dir = tempfile::tempdir().unwrap();
    let client = LoanApiClient::new(spawn_service().await, None);

    let pdf = client.download_sanction("SL-42").await.unwrap();
    let path = save_letter(dir.path(), &sanction_file_name("SL-42"), &pdf)
        .await
        .unwrap();

    assert_eq!(path, dir.path().join("sanction_SL-42.pdf"));
    assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-1.4 SL-42".to_vec());
}

#[tokio::test]
async fn test_health() {
    let client = LoanApiClient::new(spawn_service().await, None);
    let health = client.health().await.unwrap();
    assert!(health.is_healthy());
    assert_eq!(health.service.as_deref(), Some("loan-chatbot-api"));
}

// =============================================================================
// ERROR MAPPING
// =============================================================================

#[tokio::test]
async fn test_unknown_session_is_not_found() {
    let client = LoanApiClient::new(spawn_service().await, None);
    match client.fetch_session("nope").await {
        Err(ClientError::NotFound(body)) => assert_eq!(body, "Session not found"),
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[tokio::test]
async fn test_letter_before_approval_is_rejected() {
    let client = LoanApiClient::new(spawn_service().await, None);
    match client.fetch_sanction_letter("pending").await {
        Err(ClientError::Rejected(400, body)) => assert_eq!(body, "Loan not approved yet"),
        other => panic!("expected Rejected, got {other:?}"),
    }
}

#[tokio::test]
async fn test_server_error() {
    let base = spawn_service().await;
    let client = LoanApiClient::new(format!("{base}/broken"), None);
    match client.start_session().await {
        Err(ClientError::ServerError(500, body)) => assert_eq!(body, "boom"),
        other => panic!("expected ServerError, got {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_body_is_parse_error() {
    let base = spawn_service().await;
    let client = LoanApiClient::new(format!("{base}/garbage"), None);
    assert!(matches!(
        client.start_session().await,
        Err(ClientError::ParseError(_))
    ));
}

#[tokio::test]
async fn test_bearer_auth() {
    let base = spawn_service().await;

    let anonymous = LoanApiClient::new(format!("{base}/secure"), None);
    assert!(matches!(
        anonymous.health().await,
        Err(ClientError::Unauthorized)
    ));

    let keyed = LoanApiClient::new(format!("{base}/secure"), Some("sk-test".into()));
    assert!(keyed.health().await.unwrap().is_healthy());
}

#[tokio::test]
async fn test_connection_refused() {
    // Bind then drop to get a port nobody listens on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = LoanApiClient::new(format!("http://{addr}"), None);
    assert!(matches!(
        client.start_session().await,
        Err(ClientError::ConnectionFailed(_))
    ));
}
