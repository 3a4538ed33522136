//! Interactive conversation loop.
//!
//! Lines starting with `/` are commands; anything else is sent as a chat
//! message. One turn runs at a time, so the prompt only comes back once the
//! previous reply has been applied.

use super::commands::render_state;
use crate::client::LoanApi;
use crate::config::expand_home;
use crate::controller::ChatController;
use crate::error::AppError;
use crate::render::{Style, render_message, render_panel};
use loanchat_core::{ChatState, LoanChatError};
use std::io::{IsTerminal, Write};
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, BufReader};

const HELP: &str = "\
Commands:
  /upload <file.pdf>   Upload your salary slip when asked (PDF, at most 5 MB)
  /status              Show loan summary and agent progress
  /download [dir]      Save the sanction letter once approved
  /help                Show this help
  /quit                Leave the conversation
Anything else is sent to the assistant.";

/// Prompt hint once the conversation has ended.
const CLOSED_HINT: &str = "Conversation closed. /status, /download or /quit";

/// One parsed line of input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Message(String),
    Upload(PathBuf),
    Status,
    Download(Option<PathBuf>),
    Help,
    Quit,
}

/// Parse a line of input. Blank lines yield `None`; a leading `~` in a
/// path argument is expanded.
pub fn parse_repl_line(line: &str) -> Option<ReplCommand> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }

    let Some(rest) = trimmed.strip_prefix('/') else {
        return Some(ReplCommand::Message(trimmed.to_string()));
    };

    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (rest, ""),
    };

    let command = match name {
        "upload" if !arg.is_empty() => ReplCommand::Upload(expand_home(Path::new(arg))),
        "status" => ReplCommand::Status,
        "download" if arg.is_empty() => ReplCommand::Download(None),
        "download" => ReplCommand::Download(Some(expand_home(Path::new(arg)))),
        "help" | "?" => ReplCommand::Help,
        "quit" | "exit" | "q" => ReplCommand::Quit,
        // Unknown commands go to the assistant as typed
        _ => ReplCommand::Message(trimmed.to_string()),
    };
    Some(command)
}

/// Run the conversation until `/quit` or end of input.
pub async fn run<A: LoanApi>(
    mut controller: ChatController<A>,
    download_dir: &Path,
) -> Result<(), AppError> {
    let style = if std::io::stdout().is_terminal() {
        Style::ANSI
    } else {
        Style::PLAIN
    };
    let mut shown = 0;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("Session {}  (type /help for commands)", controller.state().session_id());
    println!();

    loop {
        shown = print_new_messages(&controller, shown, style);
        prompt(&controller)?;

        let Some(line) = lines.next_line().await? else {
            println!();
            break;
        };
        let Some(command) = parse_repl_line(&line) else {
            continue;
        };

        match command {
            ReplCommand::Quit => break,
            ReplCommand::Help => println!("{HELP}\n"),
            ReplCommand::Status => {
                println!("{}", render_state(controller.state(), "/download"));
            }
            ReplCommand::Message(text) => match controller.send(&text).await {
                Ok(()) => {}
                Err(LoanChatError::InputClosed) => println!("{CLOSED_HINT}\n"),
                Err(e) => println!("{e}\n"),
            },
            ReplCommand::Upload(path) => {
                if let Err(e) = controller.upload(&path).await {
                    println!("{e}\n");
                }
            }
            ReplCommand::Download(dir) => {
                let dir = dir.as_deref().unwrap_or(download_dir);
                match controller.download_sanction(dir).await {
                    Ok(path) => println!("Sanction letter saved to {}\n", path.display()),
                    Err(e) => println!("{e}\n"),
                }
            }
        }
    }

    let progress = controller.state().progress();
    if progress.approval_visible {
        print!("{}", render_panel(&progress, controller.state().sanction(), "/download"));
    }
    Ok(())
}

fn print_new_messages<A: LoanApi>(
    controller: &ChatController<A>,
    shown: usize,
    style: Style,
) -> usize {
    let messages = controller.state().messages();
    for message in messages.iter().skip(shown) {
        println!("{}", render_message(message, style));
    }
    messages.len()
}

/// `[KYC Verification] Type your message...> `
fn prompt_text(state: &ChatState) -> String {
    let hint = if state.is_closed() {
        CLOSED_HINT
    } else {
        state.input_hint()
    };
    format!("[{}] {hint}> ", state.progress().label())
}

fn prompt<A: LoanApi>(controller: &ChatController<A>) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    write!(stdout, "{}", prompt_text(controller.state()))?;
    stdout.flush()
}
