//! # loanchat-core
//!
//! The view-model of the loan assistant client - THE LOGIC.
//!
//! This crate holds everything the client derives or decides without
//! touching the network: the stage progress model, the JSON wire types,
//! the upload gate, message formatting, the loan summary and the chat
//! state with its one-request-at-a-time guard.
//!
//! ## Architectural Constraints
//!
//! - NO async, NO network dependencies (pure Rust)
//! - The loan service owns every record; this crate only mirrors them
//! - Derived values are recomputed from the current stage on each call
//! - Unknown stage strings are tolerated, never rejected

// =============================================================================
// MODULES
// =============================================================================

pub mod chat;
pub mod format;
pub mod stage;
pub mod summary;
pub mod types;
pub mod upload;
pub mod wire;

// =============================================================================
// RE-EXPORTS: Stage Progress Model
// =============================================================================

pub use stage::{
    AGENTS, Agent, AgentStatus, AgentView, Stage, StageProgress, agent_status, agent_status_of,
    approval_visible, progress_percentage, stage_index, stage_label,
};

// =============================================================================
// RE-EXPORTS: Records, State, Wire
// =============================================================================

pub use chat::{ChatMessage, ChatState, InFlight, Role, SanctionInfo, sanction_file_name};
pub use format::{Line, Span, format_currency, format_message, format_rate, format_time};
pub use summary::LoanSummary;
pub use types::{Application, Customer, KycStatus, LoanChatError, LoanDecision};
pub use upload::{
    MAX_UPLOAD_BYTES, PDF_CONTENT_TYPE, UploadCandidate, UploadRejection, validate_upload,
};
pub use wire::{
    ChatRequest, ChatResponse, HealthResponse, HistoryEntry, InputType, ResponseMetadata,
    SessionSnapshot, StartResponse, UploadResponse,
};
