//! # Wire Types
//!
//! JSON bodies exchanged with the loan service.
//!
//! | Call | Request | Response |
//! |------|---------|----------|
//! | `POST /api/chat/start` | - | [`StartResponse`] |
//! | `POST /api/chat` | [`ChatRequest`] | [`ChatResponse`] |
//! | `GET /api/session/{id}` | - | [`SessionSnapshot`] |
//! | `POST /api/upload?session_id=` | multipart `file` | [`UploadResponse`] |
//! | `GET /api/health` | - | [`HealthResponse`] |
//!
//! Stages travel as raw strings so that an unknown stage from a newer
//! service still decodes.

use crate::types::{Application, Customer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// =============================================================================
// SESSION START
// =============================================================================

/// Reply to `POST /api/chat/start`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartResponse {
    pub session_id: String,
    pub message: String,
    pub stage: String,
}

// =============================================================================
// CHAT TURN
// =============================================================================

/// Body of `POST /api/chat`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub session_id: String,
    pub message: String,
}

/// What kind of input the service expects next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum InputType {
    #[default]
    Text,
    File,
    Choice,
}

/// Free-form metadata attached to a reply.
///
/// Only `sanction_id` has meaning to the client; everything else is kept
/// verbatim for display and JSON output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct ResponseMetadata(pub Map<String, Value>);

impl ResponseMetadata {
    /// Identifier of an issued sanction letter, present once a loan is approved.
    #[must_use]
    pub fn sanction_id(&self) -> Option<&str> {
        match self.0.get("sanction_id") {
            Some(Value::String(id)) if !id.is_empty() => Some(id),
            _ => None,
        }
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }
}

/// Reply to `POST /api/chat`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub session_id: Option<String>,
    pub message: String,
    pub stage: String,
    #[serde(default = "default_requires_input")]
    pub requires_input: bool,
    /// `null` on the wire means the same as absent: plain text.
    #[serde(default, deserialize_with = "nullable_input_type")]
    pub input_type: InputType,
    #[serde(default)]
    pub choices: Option<Vec<String>>,
    #[serde(default)]
    pub metadata: Option<ResponseMetadata>,
}

fn default_requires_input() -> bool {
    true
}

fn nullable_input_type<'de, D>(deserializer: D) -> Result<InputType, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<InputType>::deserialize(deserializer).map(Option::unwrap_or_default)
}

// =============================================================================
// SESSION SNAPSHOT
// =============================================================================

/// Reply to `GET /api/session/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub session_id: String,
    #[serde(default)]
    pub stage: Option<String>,
    #[serde(default)]
    pub customer: Option<Customer>,
    #[serde(default)]
    pub application: Option<Application>,
    #[serde(default)]
    pub conversation_history: Vec<HistoryEntry>,
}

/// One stored turn of the conversation, as the service records it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub role: String,
    #[serde(default)]
    pub content: String,
}

// =============================================================================
// UPLOAD
// =============================================================================

/// Reply to `POST /api/upload`.
///
/// A refused upload (unreadable slip, name mismatch) arrives as
/// `success: false` with an explanatory `message` and no stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub success: bool,
    pub message: String,
    #[serde(default)]
    pub stage: Option<String>,
    #[serde(default)]
    pub metadata: Option<ResponseMetadata>,
    #[serde(default)]
    pub parsed_salary: Option<f64>,
    #[serde(default)]
    pub name_mismatch: bool,
}

// =============================================================================
// HEALTH
// =============================================================================

/// Reply to `GET /api/health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    #[serde(default)]
    pub service: Option<String>,
}

impl HealthResponse {
    #[must_use]
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy" || self.status == "ok"
    }
}

// =============================================================================
// TESTS
// =============================================================================
