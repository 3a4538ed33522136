//! # Upload Validation
//!
//! Client-side gate for salary-slip uploads. Only PDFs of at most 5 MB are
//! sent; anything else is rejected before a byte leaves the machine.
//!
//! The check is advisory. The service enforces its own limits and may still
//! refuse a file that passes here.

use thiserror::Error;

/// Largest accepted upload (5 MiB).
pub const MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

/// The only accepted content type.
pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// Why a file was refused before transmission.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadRejection {
    #[error("Please upload a PDF file only.")]
    NotPdf,

    #[error("File size must be less than 5MB.")]
    TooLarge { size: u64, limit: u64 },
}

/// A file picked for upload, described without reading its contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadCandidate {
    pub file_name: String,
    /// Content type as a file picker would report it (derived from the name).
    pub content_type: String,
    pub size: u64,
}

impl UploadCandidate {
    #[must_use]
    pub fn new(file_name: impl Into<String>, content_type: impl Into<String>, size: u64) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            size,
        }
    }

    /// Transcript line recorded when the upload is sent.
    #[must_use]
    pub fn transcript_line(&self) -> String {
        format!("📄 Uploaded: {}", self.file_name)
    }
}

/// Check type first, then size.
pub fn validate_upload(candidate: &UploadCandidate) -> Result<(), UploadRejection> {
    if candidate.content_type != PDF_CONTENT_TYPE {
        return Err(UploadRejection::NotPdf);
    }
    if candidate.size > MAX_UPLOAD_BYTES {
        return Err(UploadRejection::TooLarge {
            size: candidate.size,
            limit: MAX_UPLOAD_BYTES,
        });
    }
    Ok(())
}
