//! # loanchat CLI Module
//!
//! ## Available Commands
//!
//! - `chat` - Interactive loan conversation (default)
//! - `stage` - Show the agent panel for a stage, offline
//! - `session` - Show summary and progress of a stored session
//! - `upload` - Upload a salary slip into a session
//! - `sanction` - Download the sanction letter of an approved session, or
//!   an issued letter by `--id`
//! - `health` - Check that the loan service is up

mod commands;
mod repl;

use crate::config::Settings;
use crate::error::AppError;
use clap::{Parser, Subcommand};
use loanchat_core::LoanChatError;
use std::path::PathBuf;

pub use commands::*;
pub use repl::{ReplCommand, parse_repl_line};

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// loanchat - loan assistant terminal client
///
/// Talks to the loan assistant service and shows the conversation, the
/// loan summary and the progress of each agent.
#[derive(Parser, Debug)]
#[command(name = "loanchat")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Loan service base URL (overrides config and LOANCHAT_URL)
    #[arg(short = 'u', long, global = true)]
    pub url: Option<String>,

    /// Path to a TOML config file
    #[arg(short = 'c', long, global = true)]
    pub config: Option<PathBuf>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start (or resume) an interactive conversation
    Chat {
        /// Resume an existing session instead of starting a new one
        #[arg(short, long)]
        session: Option<String>,
    },

    /// Show the agent panel for a stage without contacting the service
    Stage {
        /// Stage name (e.g. kyc_verification)
        stage: String,

        /// Treat the loan as approved
        #[arg(short, long)]
        approved: bool,
    },

    /// Show summary and progress of a stored session
    Session {
        /// Session ID
        session_id: String,
    },

    /// Upload a salary slip the service asked for (PDF, at most 5 MB)
    Upload {
        /// Session ID
        session_id: String,

        /// Path to the PDF
        file: PathBuf,
    },

    /// Download the sanction letter of an approved session
    Sanction {
        /// Session ID
        #[arg(required_unless_present = "id")]
        session_id: Option<String>,

        /// Fetch an issued letter by its sanction ID instead
        #[arg(long, conflicts_with = "session_id")]
        id: Option<String>,

        /// Directory to write into (default: config download_dir)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Check that the loan service is up
    Health,
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), AppError> {
    let json_mode = cli.json_mode;

    let command = match cli.command {
        // Offline: no settings, no service.
        Some(Commands::Stage { stage, approved }) => {
            return cmd_stage(&stage, approved, json_mode);
        }
        Some(command) => command,
        // No subcommand - start a conversation by default
        None => Commands::Chat { session: None },
    };

    let settings = Settings::load(cli.config.as_deref(), cli.url)?;
    tracing::debug!(api_url = %settings.api_url, "settings resolved");

    match command {
        Commands::Chat { session } => cmd_chat(&settings, session.as_deref()).await,
        Commands::Session { session_id } => cmd_session(&settings, &session_id, json_mode).await,
        Commands::Upload { session_id, file } => {
            cmd_upload(&settings, &session_id, &file, json_mode).await
        }
        Commands::Sanction {
            session_id,
            id,
            output,
        } => {
            let dir = output.unwrap_or_else(|| settings.download_dir.clone());
            match (id, session_id) {
                (Some(sanction_id), _) => cmd_letter(&settings, &sanction_id, &dir, json_mode).await,
                (None, Some(session_id)) => {
                    cmd_sanction(&settings, &session_id, &dir, json_mode).await
                }
                (None, None) => Err(LoanChatError::SanctionUnavailable.into()),
            }
        }
        Commands::Health => cmd_health(&settings, json_mode).await,
        Commands::Stage { stage, approved } => cmd_stage(&stage, approved, json_mode),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanction_by_session_or_id() {
        let cli = Cli::try_parse_from(["loanchat", "sanction", "s-1", "-o", "/tmp"]).expect("parse");
        assert!(matches!(
            cli.command,
            Some(Commands::Sanction { session_id: Some(ref s), id: None, .. }) if s == "s-1"
        ));

        let cli = Cli::try_parse_from(["loanchat", "sanction", "--id", "SL-42"]).expect("parse");
        assert!(matches!(
            cli.command,
            Some(Commands::Sanction { session_id: None, id: Some(ref id), .. }) if id == "SL-42"
        ));
    }

    #[test]
    fn sanction_needs_session_or_id() {
        assert!(Cli::try_parse_from(["loanchat", "sanction"]).is_err());
        assert!(Cli::try_parse_from(["loanchat", "sanction", "s-1", "--id", "SL-42"]).is_err());
    }
}
