//! # Core Type Definitions
//!
//! Records mirrored from the loan service and the crate error type.
//!
//! `Customer` and `Application` are owned by the service. The client only
//! decodes them from session snapshots and reads them; nothing here mutates
//! them. Decoding is lenient: missing fields take defaults and unknown
//! fields are ignored, so a newer service does not break an older client.

use crate::upload::UploadRejection;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// CUSTOMER
// =============================================================================

/// KYC state of a customer as recorded by the CRM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum KycStatus {
    Verified,
    #[default]
    Pending,
    Failed,
}

/// Customer profile, as the service exposes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Customer {
    pub id: Option<String>,
    pub name: String,
    pub age: Option<u32>,
    pub city: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub credit_score: Option<u32>,
    pub monthly_salary: Option<f64>,
    pub current_loans: Option<u32>,
    pub pre_approved_limit: Option<f64>,
    pub kyc_status: KycStatus,
    pub address: Option<String>,
}

// =============================================================================
// APPLICATION
// =============================================================================

/// Underwriting outcome recorded on the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LoanDecision {
    Approved,
    Rejected,
    /// Approval depends on a salary slip upload.
    Conditional,
    #[default]
    Pending,
}

/// Loan application state.
///
/// The service keeps a few aliases (`tenure` for `approved_tenure`,
/// `emi_amount` for `emi`); both spellings are kept so the summary can fall
/// back from one to the other.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Application {
    pub application_id: Option<String>,
    pub customer_id: Option<String>,
    pub phone: Option<String>,
    pub requested_amount: Option<f64>,
    pub requested_tenure: Option<u32>,
    pub approved_amount: Option<f64>,
    pub approved_tenure: Option<u32>,
    pub tenure: Option<u32>,
    pub interest_rate: Option<f64>,
    pub emi: Option<f64>,
    pub emi_amount: Option<f64>,
    pub loan_approved: bool,
    pub decision: LoanDecision,
    pub decision_reason: Option<String>,
    pub reason_code: Option<String>,
    pub salary_slip_uploaded: bool,
    pub salary_slip_url: Option<String>,
    pub parsed_salary: Option<f64>,
    pub sanction_id: Option<String>,
    pub sanction_letter_url: Option<String>,
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors raised by the chat view state.
///
/// None of these are fatal: every one leaves the state interactive.
#[derive(Debug, Error)]
pub enum LoanChatError {
    /// The message was empty or whitespace only.
    #[error("Message is empty")]
    InvalidInput,

    /// A request is already in flight.
    #[error("A request is already in progress")]
    Busy,

    /// The conversation reached `close`; no further input is accepted.
    #[error("The conversation is closed")]
    InputClosed,

    /// The service has not asked for a document.
    #[error("No document has been requested yet")]
    UploadNotRequested,

    /// The file failed client-side validation and was not sent.
    #[error("Upload rejected: {0}")]
    UploadRejected(#[from] UploadRejection),

    /// No approved sanction letter is available for download yet.
    #[error("No sanction letter available")]
    SanctionUnavailable,

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(String),
}

// =============================================================================
// TESTS
// =============================================================================
