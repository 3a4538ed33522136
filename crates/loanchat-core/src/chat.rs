//! # Chat View State
//!
//! Everything the chat screen shows, plus the one-slot request guard.
//!
//! ## Request Discipline
//!
//! At most one request is in flight. `begin_*` claims the slot and returns
//! what to transmit; exactly one of `complete_*` / `fail_*` releases it.
//! While the slot is taken, further `begin_*` calls return
//! [`LoanChatError::Busy`] and touch nothing.
//!
//! Input that never needs the network (blank messages, files failing the
//! upload gate) is refused before the slot is claimed, so the caller has
//! nothing to send.

use crate::stage::{Stage, StageProgress, approval_visible};
use crate::types::{Application, Customer, LoanChatError, LoanDecision};
use crate::upload::{UploadCandidate, validate_upload};
use crate::wire::{
    ChatRequest, ChatResponse, InputType, ResponseMetadata, SessionSnapshot, StartResponse,
    UploadResponse,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Shown when a chat turn fails in transport.
pub const CHAT_FAILURE_MESSAGE: &str = "❌ Sorry, something went wrong. Please try again.";

/// Shown when an upload fails in transport.
pub const UPLOAD_FAILURE_MESSAGE: &str = "❌ Failed to upload file. Please try again.";

/// Input hint while the service waits for a document.
pub const FILE_HINT: &str = "Upload your salary slip above...";

/// Input hint otherwise.
pub const TEXT_HINT: &str = "Type your message...";

/// `sanction_{id}.pdf`
#[must_use]
pub fn sanction_file_name(sanction_id: &str) -> String {
    format!("sanction_{sanction_id}.pdf")
}

// =============================================================================
// MESSAGES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

/// One entry of the transcript.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ResponseMetadata>,
}

impl ChatMessage {
    fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            timestamp: Utc::now(),
            metadata: None,
        }
    }

    fn assistant(content: impl Into<String>, metadata: Option<ResponseMetadata>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            timestamp: Utc::now(),
            metadata,
        }
    }
}

/// The issued sanction letter, once the service reports one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SanctionInfo {
    pub sanction_id: String,
    pub session_id: String,
    pub metadata: ResponseMetadata,
}

/// Which request holds the slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InFlight {
    Chat,
    Upload,
}

// =============================================================================
// CHAT STATE
// =============================================================================

/// Per-session UI state.
#[derive(Debug, Clone)]
pub struct ChatState {
    session_id: String,
    messages: Vec<ChatMessage>,
    in_flight: Option<InFlight>,
    current_stage: String,
    requires_file_upload: bool,
    sanction: Option<SanctionInfo>,
    customer: Option<Customer>,
    application: Option<Application>,
}

impl ChatState {
    /// State for a freshly started session: the greeting is the first message.
    #[must_use]
    pub fn new(start: StartResponse) -> Self {
        Self {
            session_id: start.session_id,
            messages: vec![ChatMessage::assistant(start.message, None)],
            in_flight: None,
            current_stage: start.stage,
            requires_file_upload: false,
            sanction: None,
            customer: None,
            application: None,
        }
    }

    /// State rebuilt from a stored session, transcript included.
    #[must_use]
    pub fn from_snapshot(snapshot: SessionSnapshot) -> Self {
        let messages = snapshot
            .conversation_history
            .iter()
            .map(|entry| {
                if entry.role == "user" {
                    ChatMessage::user(entry.content.clone())
                } else {
                    ChatMessage::assistant(entry.content.clone(), None)
                }
            })
            .collect();

        let mut state = Self {
            session_id: snapshot.session_id.clone(),
            messages,
            in_flight: None,
            current_stage: snapshot
                .stage
                .clone()
                .unwrap_or_else(|| Stage::Greeting.as_str().to_string()),
            requires_file_upload: false,
            sanction: None,
            customer: None,
            application: None,
        };
        state.apply_snapshot(snapshot);
        // The snapshot has no input type; a conditional decision without a
        // slip on file means the service is still waiting for one.
        state.requires_file_upload = state.application.as_ref().is_some_and(|app| {
            app.decision == LoanDecision::Conditional && !app.salary_slip_uploaded
        });
        state
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    #[must_use]
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    #[must_use]
    pub fn current_stage(&self) -> &str {
        &self.current_stage
    }

    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    #[must_use]
    pub fn in_flight(&self) -> Option<InFlight> {
        self.in_flight
    }

    #[must_use]
    pub fn requires_file_upload(&self) -> bool {
        self.requires_file_upload
    }

    #[must_use]
    pub fn sanction(&self) -> Option<&SanctionInfo> {
        self.sanction.as_ref()
    }

    #[must_use]
    pub fn customer(&self) -> Option<&Customer> {
        self.customer.as_ref()
    }

    #[must_use]
    pub fn application(&self) -> Option<&Application> {
        self.application.as_ref()
    }

    // -------------------------------------------------------------------------
    // Derived state (recomputed on every call)
    // -------------------------------------------------------------------------

    /// The conversation reached `close`.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        Stage::parse(&self.current_stage).is_some_and(Stage::is_terminal)
    }

    /// The text input accepts messages.
    #[must_use]
    pub fn input_enabled(&self) -> bool {
        !self.is_busy() && !self.is_closed()
    }

    #[must_use]
    pub fn input_hint(&self) -> &'static str {
        if self.requires_file_upload {
            FILE_HINT
        } else {
            TEXT_HINT
        }
    }

    #[must_use]
    pub fn progress(&self) -> StageProgress {
        StageProgress::observe(&self.current_stage, self.application.as_ref())
    }

    #[must_use]
    pub fn approval_visible(&self) -> bool {
        approval_visible(&self.current_stage, self.application.as_ref())
    }

    /// The approval card is up and a letter has been issued.
    #[must_use]
    pub fn download_available(&self) -> bool {
        self.approval_visible() && self.sanction.is_some()
    }

    /// File name offered for the downloaded letter.
    #[must_use]
    pub fn sanction_file_name(&self) -> Option<String> {
        self.sanction
            .as_ref()
            .map(|s| sanction_file_name(&s.sanction_id))
    }

    // -------------------------------------------------------------------------
    // Chat turn
    // -------------------------------------------------------------------------

    /// Claim the slot for a chat turn and record the user's message.
    pub fn begin_send(&mut self, text: &str) -> Result<ChatRequest, LoanChatError> {
        if text.trim().is_empty() {
            return Err(LoanChatError::InvalidInput);
        }
        if self.is_busy() {
            return Err(LoanChatError::Busy);
        }
        if self.is_closed() {
            return Err(LoanChatError::InputClosed);
        }

        self.messages.push(ChatMessage::user(text));
        self.in_flight = Some(InFlight::Chat);

        Ok(ChatRequest {
            session_id: self.session_id.clone(),
            message: text.to_string(),
        })
    }

    /// Apply the service's reply and release the slot.
    pub fn complete_send(&mut self, response: ChatResponse) {
        self.requires_file_upload = response.input_type == InputType::File;
        self.record_reply(response.message, response.stage, response.metadata);
        self.in_flight = None;
    }

    /// Record a transport failure and release the slot. The stage is kept.
    pub fn fail_send(&mut self) {
        self.messages
            .push(ChatMessage::assistant(CHAT_FAILURE_MESSAGE, None));
        self.in_flight = None;
    }

    // -------------------------------------------------------------------------
    // Upload
    // -------------------------------------------------------------------------

    /// Validate a picked file and claim the slot for it.
    ///
    /// Only accepted while the service has asked for a document. A refused
    /// file leaves the transcript and the slot untouched.
    pub fn begin_upload(&mut self, candidate: &UploadCandidate) -> Result<(), LoanChatError> {
        if self.is_busy() {
            return Err(LoanChatError::Busy);
        }
        if !self.requires_file_upload {
            return Err(LoanChatError::UploadNotRequested);
        }
        validate_upload(candidate)?;

        self.messages
            .push(ChatMessage::user(candidate.transcript_line()));
        self.in_flight = Some(InFlight::Upload);
        Ok(())
    }

    /// Apply the upload reply and release the slot.
    pub fn complete_upload(&mut self, response: UploadResponse) {
        if response.success {
            self.requires_file_upload = false;
            let stage = response
                .stage
                .unwrap_or_else(|| self.current_stage.clone());
            self.record_reply(response.message, stage, response.metadata);
        } else {
            self.messages
                .push(ChatMessage::assistant(response.message, None));
        }
        self.in_flight = None;
    }

    pub fn fail_upload(&mut self) {
        self.messages
            .push(ChatMessage::assistant(UPLOAD_FAILURE_MESSAGE, None));
        self.in_flight = None;
    }

    // -------------------------------------------------------------------------
    // Mirrored session state
    // -------------------------------------------------------------------------

    /// Mirror customer and application from a snapshot.
    ///
    /// Absent records keep the previous mirror. An application carrying a
    /// `sanction_id` counts as an issued letter if no reply reported one.
    pub fn apply_snapshot(&mut self, snapshot: SessionSnapshot) {
        if let Some(customer) = snapshot.customer {
            self.customer = Some(customer);
        }
        if let Some(application) = snapshot.application {
            if self.sanction.is_none() {
                if let Some(id) = application.sanction_id.as_deref().filter(|id| !id.is_empty()) {
                    self.sanction = Some(SanctionInfo {
                        sanction_id: id.to_string(),
                        session_id: self.session_id.clone(),
                        metadata: ResponseMetadata::default(),
                    });
                }
            }
            self.application = Some(application);
        }
    }

    fn record_reply(&mut self, message: String, stage: String, metadata: Option<ResponseMetadata>) {
        if let Some(meta) = metadata.as_ref() {
            if let Some(id) = meta.sanction_id() {
                self.sanction = Some(SanctionInfo {
                    sanction_id: id.to_string(),
                    session_id: self.session_id.clone(),
                    metadata: meta.clone(),
                });
            }
        }
        self.messages.push(ChatMessage::assistant(message, metadata));
        self.current_stage = stage;
    }
}

// =============================================================================
// TESTS
// =============================================================================
