//! # Loan Service HTTP Client
//!
//! Wrapper around the loan service REST API, plus the [`LoanApi`] trait the
//! controller is written against.
//!
//! No retries and no timeouts: a failed call is reported once and the
//! caller decides what the user sees.

use loanchat_core::{
    ChatRequest, ChatResponse, HealthResponse, PDF_CONTENT_TYPE, SessionSnapshot, StartResponse,
    UploadResponse,
};
use serde::de::DeserializeOwned;
use std::future::Future;
use thiserror::Error;

/// Errors from the HTTP client layer.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Cannot reach the loan service.
    #[error("Cannot connect to loan service at {0}")]
    ConnectionFailed(String),

    /// 401 Unauthorized - invalid or missing API key.
    #[error("Unauthorized: invalid or missing API key")]
    Unauthorized,

    /// 404 - unknown session or letter.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Any other 4xx (e.g. sanction letter requested before approval).
    #[error("Request rejected ({0}): {1}")]
    Rejected(u16, String),

    /// Server returned a 5xx error.
    #[error("Server error ({0}): {1}")]
    ServerError(u16, String),

    /// Failed to parse response body.
    #[error("Parse error: {0}")]
    ParseError(String),
}

// =============================================================================
// API TRAIT
// =============================================================================

/// The calls the client makes against the loan service.
pub trait LoanApi {
    /// `POST /api/chat/start`
    fn start_session(&self) -> impl Future<Output = Result<StartResponse, ClientError>> + Send;

    /// `POST /api/chat`
    fn send_message(
        &self,
        request: &ChatRequest,
    ) -> impl Future<Output = Result<ChatResponse, ClientError>> + Send;

    /// `GET /api/session/{id}`
    fn fetch_session(
        &self,
        session_id: &str,
    ) -> impl Future<Output = Result<SessionSnapshot, ClientError>> + Send;

    /// `POST /api/upload?session_id=` with a multipart `file` field.
    fn upload_document(
        &self,
        session_id: &str,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> impl Future<Output = Result<UploadResponse, ClientError>> + Send;

    /// `GET /api/sanction/generate/{session_id}` - PDF bytes.
    fn fetch_sanction_letter(
        &self,
        session_id: &str,
    ) -> impl Future<Output = Result<Vec<u8>, ClientError>> + Send;
}

// =============================================================================
// REQWEST CLIENT
// =============================================================================

/// HTTP client that wraps calls to the loan service.
#[derive(Clone)]
pub struct LoanApiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl LoanApiClient {
    /// Create a new client pointing at the given service URL.
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            base_url,
            api_key,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build a request with optional Bearer auth.
    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let mut req = self.http.request(method, &url);
        if let Some(ref key) = self.api_key {
            req = req.bearer_auth(key);
        }
        req
    }

    /// Send a request and handle connection errors.
    async fn send(&self, req: reqwest::RequestBuilder) -> Result<reqwest::Response, ClientError> {
        req.send()
            .await
            .map_err(|e| ClientError::ConnectionFailed(format!("{}: {e}", self.base_url)))
    }

    /// Map non-success statuses onto [`ClientError`].
    async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, ClientError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(ClientError::Unauthorized);
        }
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound(body));
        }
        if status.is_server_error() {
            return Err(ClientError::ServerError(status.as_u16(), body));
        }
        Err(ClientError::Rejected(status.as_u16(), body))
    }

    /// Check the status and decode the JSON body.
    async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ClientError> {
        Self::check_status(resp)
            .await?
            .json::<T>()
            .await
            .map_err(|e| ClientError::ParseError(e.to_string()))
    }

    async fn fetch_bytes(&self, path: &str) -> Result<Vec<u8>, ClientError> {
        let req = self.request(reqwest::Method::GET, path);
        let resp = Self::check_status(self.send(req).await?).await?;
        resp.bytes()
            .await
            .map(|b| b.to_vec())
            .map_err(|e| ClientError::ParseError(e.to_string()))
    }

    /// GET /api/health
    pub async fn health(&self) -> Result<HealthResponse, ClientError> {
        let req = self.request(reqwest::Method::GET, "/api/health");
        Self::decode(self.send(req).await?).await
    }

    /// GET /api/sanction/download/{sanction_id} - an issued letter by its id.
    pub async fn download_sanction(&self, sanction_id: &str) -> Result<Vec<u8>, ClientError> {
        self.fetch_bytes(&format!("/api/sanction/download/{sanction_id}"))
            .await
    }
}

impl LoanApi for LoanApiClient {
    async fn start_session(&self) -> Result<StartResponse, ClientError> {
        let req = self.request(reqwest::Method::POST, "/api/chat/start");
        Self::decode(self.send(req).await?).await
    }

    async fn send_message(&self, request: &ChatRequest) -> Result<ChatResponse, ClientError> {
        let req = self.request(reqwest::Method::POST, "/api/chat").json(request);
        Self::decode(self.send(req).await?).await
    }

    async fn fetch_session(&self, session_id: &str) -> Result<SessionSnapshot, ClientError> {
        let req = self.request(reqwest::Method::GET, &format!("/api/session/{session_id}"));
        Self::decode(self.send(req).await?).await
    }

    async fn upload_document(
        &self,
        session_id: &str,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadResponse, ClientError> {
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(PDF_CONTENT_TYPE)
            .map_err(|e| ClientError::ParseError(e.to_string()))?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let req = self
            .request(reqwest::Method::POST, "/api/upload")
            .query(&[("session_id", session_id)])
            .multipart(form);
        Self::decode(self.send(req).await?).await
    }

    async fn fetch_sanction_letter(&self, session_id: &str) -> Result<Vec<u8>, ClientError> {
        self.fetch_bytes(&format!("/api/sanction/generate/{session_id}"))
            .await
    }
}
