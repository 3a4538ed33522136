//! # Chat Controller
//!
//! Drives a [`ChatState`] against a [`LoanApi`].
//!
//! Each user action runs to completion before the next is accepted: the
//! state's slot is claimed before the request goes out and released when
//! the reply (or the failure) is applied. Input refused by the state never
//! reaches the API.
//!
//! After every successful turn the session snapshot is fetched to refresh
//! the mirrored customer and application. A failed refresh is logged and
//! otherwise ignored; the turn itself has already been applied.

use crate::client::LoanApi;
use crate::error::AppError;
use loanchat_core::{ChatState, LoanChatError, UploadCandidate};
use std::path::{Path, PathBuf};

/// Owns the chat state and the API it talks to.
pub struct ChatController<A> {
    api: A,
    state: ChatState,
}

impl<A: LoanApi> ChatController<A> {
    /// Start a new session and show its greeting.
    pub async fn start(api: A) -> Result<Self, AppError> {
        let start = api.start_session().await?;
        tracing::info!(session_id = %start.session_id, stage = %start.stage, "session started");
        Ok(Self {
            api,
            state: ChatState::new(start),
        })
    }

    /// Attach to an existing session, transcript included.
    pub async fn resume(api: A, session_id: &str) -> Result<Self, AppError> {
        let snapshot = api.fetch_session(session_id).await?;
        tracing::info!(session_id, "session resumed");
        Ok(Self {
            api,
            state: ChatState::from_snapshot(snapshot),
        })
    }

    pub fn state(&self) -> &ChatState {
        &self.state
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// Send one chat turn.
    ///
    /// Refused input (blank, busy, closed) is returned as an error and
    /// nothing is sent. Transport failures are absorbed into the transcript.
    pub async fn send(&mut self, text: &str) -> Result<(), LoanChatError> {
        let request = self.state.begin_send(text)?;

        match self.api.send_message(&request).await {
            Ok(response) => {
                tracing::debug!(stage = %response.stage, input_type = ?response.input_type, "chat reply");
                self.state.complete_send(response);
                self.refresh().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "chat turn failed");
                self.state.fail_send();
            }
        }
        Ok(())
    }

    /// Upload a document from disk.
    ///
    /// Only while the service is waiting for a document. The file is
    /// described from its metadata and validated before it is read; a
    /// refused file is never read or sent.
    pub async fn upload(&mut self, path: &Path) -> Result<(), LoanChatError> {
        let candidate = candidate_from_path(path).await?;
        self.state.begin_upload(&candidate)?;

        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "cannot read upload");
                self.state.fail_upload();
                return Ok(());
            }
        };

        let session_id = self.state.session_id().to_string();
        match self
            .api
            .upload_document(&session_id, &candidate.file_name, bytes)
            .await
        {
            Ok(response) => {
                let success = response.success;
                tracing::debug!(success, stage = ?response.stage, "upload reply");
                self.state.complete_upload(response);
                if success {
                    self.refresh().await;
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "upload failed");
                self.state.fail_upload();
            }
        }
        Ok(())
    }

    /// Save the sanction letter into `dir`, returning the written path.
    pub async fn download_sanction(&self, dir: &Path) -> Result<PathBuf, AppError> {
        let file_name = match self.state.sanction_file_name() {
            Some(name) if self.state.download_available() => name,
            _ => return Err(LoanChatError::SanctionUnavailable.into()),
        };

        let bytes = self
            .api
            .fetch_sanction_letter(self.state.session_id())
            .await?;
        save_letter(dir, &file_name, &bytes).await
    }

    /// Re-mirror customer and application from the service.
    pub async fn refresh(&mut self) {
        match self.api.fetch_session(self.state.session_id()).await {
            Ok(snapshot) => self.state.apply_snapshot(snapshot),
            Err(e) => tracing::warn!(error = %e, "failed to fetch session data"),
        }
    }
}

/// Write letter bytes to `dir/file_name`, returning the written path.
pub async fn save_letter(dir: &Path, file_name: &str, bytes: &[u8]) -> Result<PathBuf, AppError> {
    let target = dir.join(file_name);
    tokio::fs::write(&target, bytes)
        .await
        .map_err(|e| AppError::Io(format!("{}: {e}", target.display())))?;

    tracing::info!(path = %target.display(), bytes = bytes.len(), "sanction letter saved");
    Ok(target)
}

/// Describe a file the way a file picker would: name, type from the
/// extension, size from metadata.
pub async fn candidate_from_path(path: &Path) -> Result<UploadCandidate, LoanChatError> {
    let metadata = tokio::fs::metadata(path)
        .await
        .map_err(|e| LoanChatError::IoError(format!("{}: {e}", path.display())))?;
    if !metadata.is_file() {
        return Err(LoanChatError::IoError(format!(
            "{} is not a regular file",
            path.display()
        )));
    }

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let content_type = mime_guess::from_path(path)
        .first_raw()
        .unwrap_or("application/octet-stream")
        .to_string();

    Ok(UploadCandidate::new(file_name, content_type, metadata.len()))
}
