//! # loanchat - Loan Assistant Client
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │                 apps/loanchat (THE BINARY)             │
//! │                                                        │
//! │  ┌─────────────┐   ┌──────────────┐   ┌─────────────┐  │
//! │  │    CLI      │   │  Controller  │   │ HTTP client │  │
//! │  │   (clap)    │──▶│ (one turn at │──▶│  (reqwest)  │  │
//! │  └─────────────┘   │   a time)    │   └─────────────┘  │
//! │                    └──────┬───────┘                    │
//! │                           ▼                            │
//! │                   ┌───────────────┐                    │
//! │                   │ loanchat-core │                    │
//! │                   │ (VIEW-MODEL)  │                    │
//! │                   └───────────────┘                    │
//! └────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Talk to the assistant (default command)
//! loanchat --url http://localhost:8000
//!
//! # Inspect a session, fetch its letter
//! loanchat session 3f6c...
//! loanchat sanction 3f6c... -o ~/Downloads
//!
//! # Agent panel for a stage, no service needed
//! loanchat stage underwriting
//! ```

use clap::Parser;
use loanchat::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    let cli = cli::Cli::parse();

    // LOANCHAT_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("LOANCHAT_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let default_filter = if cli.verbose {
        "loanchat=debug,loanchat_core=debug"
    } else {
        "loanchat=info"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    // Logs go to stderr; stdout carries the conversation and JSON output.
    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the startup banner.
fn print_banner() {
    println!(
        r#"
  loanchat v{}
  Personal loan assistant

  Master • Sales • Verification • Underwriting • Sanction
"#,
        env!("CARGO_PKG_VERSION")
    );
}
