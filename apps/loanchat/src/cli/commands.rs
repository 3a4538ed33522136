//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use super::repl;
use crate::client::LoanApiClient;
use crate::config::Settings;
use crate::controller::{ChatController, save_letter};
use crate::error::AppError;
use crate::render::{Style, render_message, render_panel, render_summary};
use loanchat_core::{Application, ChatState, LoanSummary, StageProgress, sanction_file_name};
use std::path::Path;

fn client_for(settings: &Settings) -> LoanApiClient {
    LoanApiClient::new(settings.api_url.clone(), settings.api_key.clone())
}

/// Print a JSON value, pretty.
fn print_json(value: &serde_json::Value) {
    println!("{}", serde_json::to_string_pretty(value).unwrap_or_default());
}

/// JSON view of a stage panel.
pub fn progress_json(progress: &StageProgress) -> serde_json::Value {
    let agents: Vec<_> = progress
        .agents
        .iter()
        .map(|view| {
            serde_json::json!({
                "name": view.agent.name,
                "description": view.agent.description,
                "stage": view.agent.trigger.as_str(),
                "status": view.status.as_str(),
            })
        })
        .collect();

    serde_json::json!({
        "stage": progress.current,
        "label": progress.label(),
        "known_stage": progress.stage.is_some(),
        "progress_percent": progress.percent,
        "approval_visible": progress.approval_visible,
        "completed_agents": progress.completed_agents(),
        "agents": agents,
    })
}

/// Summary, panel and download hint for a state.
pub fn render_state(state: &ChatState, download_hint: &str) -> String {
    let summary = LoanSummary::from_application(state.application(), state.customer());
    format!(
        "{}\n{}",
        render_summary(&summary),
        render_panel(&state.progress(), state.sanction(), download_hint)
    )
}

// =============================================================================
// CHAT COMMAND
// =============================================================================

/// Interactive conversation.
pub async fn cmd_chat(settings: &Settings, session: Option<&str>) -> Result<(), AppError> {
    let client = client_for(settings);
    println!("Connecting to {} ...", client.base_url());

    let controller = match session {
        Some(id) => ChatController::resume(client, id).await?,
        None => ChatController::start(client).await?,
    };

    repl::run(controller, &settings.download_dir).await
}

// =============================================================================
// STAGE COMMAND
// =============================================================================

/// Show the agent panel for a stage, offline.
pub fn cmd_stage(stage: &str, approved: bool, json_mode: bool) -> Result<(), AppError> {
    let application = Application {
        loan_approved: approved,
        ..Application::default()
    };
    let progress = StageProgress::observe(stage, Some(&application));

    if json_mode {
        print_json(&progress_json(&progress));
        return Ok(());
    }

    print!("{}", render_panel(&progress, None, ""));
    Ok(())
}

// =============================================================================
// SESSION COMMAND
// =============================================================================

/// Show summary and progress of a stored session.
pub async fn cmd_session(
    settings: &Settings,
    session_id: &str,
    json_mode: bool,
) -> Result<(), AppError> {
    let controller = ChatController::resume(client_for(settings), session_id).await?;
    let state = controller.state();

    if json_mode {
        let summary = LoanSummary::from_application(state.application(), state.customer());
        print_json(&serde_json::json!({
            "session_id": state.session_id(),
            "progress": progress_json(&state.progress()),
            "summary": summary,
            "download_available": state.download_available(),
            "sanction_file": state.sanction_file_name(),
            "messages": state.messages().len(),
        }));
        return Ok(());
    }

    println!("Session {}", state.session_id());
    println!();
    print!(
        "{}",
        render_state(state, &format!("loanchat sanction {session_id}"))
    );
    Ok(())
}

// =============================================================================
// UPLOAD COMMAND
// =============================================================================

/// Upload a salary slip into an existing session.
pub async fn cmd_upload(
    settings: &Settings,
    session_id: &str,
    file: &Path,
    json_mode: bool,
) -> Result<(), AppError> {
    let mut controller = ChatController::resume(client_for(settings), session_id).await?;
    let before = controller.state().messages().len();

    controller.upload(file).await?;

    let state = controller.state();
    let new_messages = &state.messages()[before..];

    if json_mode {
        print_json(&serde_json::json!({
            "session_id": state.session_id(),
            "stage": state.current_stage(),
            "messages": new_messages,
        }));
        return Ok(());
    }

    for message in new_messages {
        println!("{}", render_message(message, Style::PLAIN));
    }
    Ok(())
}

// =============================================================================
// SANCTION COMMAND
// =============================================================================

/// Download the sanction letter of an approved session.
pub async fn cmd_sanction(
    settings: &Settings,
    session_id: &str,
    dir: &Path,
    json_mode: bool,
) -> Result<(), AppError> {
    let controller = ChatController::resume(client_for(settings), session_id).await?;
    let path = controller.download_sanction(dir).await?;

    if json_mode {
        print_json(&serde_json::json!({ "path": path.to_string_lossy() }));
    } else {
        println!("Sanction letter saved to {}", path.display());
    }
    Ok(())
}

/// Download an issued letter by its sanction ID.
pub async fn cmd_letter(
    settings: &Settings,
    sanction_id: &str,
    dir: &Path,
    json_mode: bool,
) -> Result<(), AppError> {
    let bytes = client_for(settings).download_sanction(sanction_id).await?;
    let path = save_letter(dir, &sanction_file_name(sanction_id), &bytes).await?;

    if json_mode {
        print_json(&serde_json::json!({ "path": path.to_string_lossy() }));
    } else {
        println!("Sanction letter saved to {}", path.display());
    }
    Ok(())
}

// =============================================================================
// HEALTH COMMAND
// =============================================================================

pub async fn cmd_health(settings: &Settings, json_mode: bool) -> Result<(), AppError> {
    let client = client_for(settings);
    let health = client.health().await?;

    if json_mode {
        print_json(&serde_json::json!({
            "url": client.base_url(),
            "status": health.status,
            "service": health.service,
            "healthy": health.is_healthy(),
        }));
        return Ok(());
    }

    println!("Service: {}", health.service.as_deref().unwrap_or("unknown"));
    println!("URL:     {}", client.base_url());
    println!("Status:  {}", health.status);
    Ok(())
}
