//! # Terminal Rendering
//!
//! Plain-text views of the transcript, the loan summary card and the agent
//! progress panel. Every function returns a `String`; printing is left to
//! the caller so the views can be tested.

use chrono::Local;
use loanchat_core::{
    AgentStatus, ChatMessage, Line, LoanSummary, Role, SanctionInfo, Span, StageProgress,
    format_message, format_time,
};

/// Width of the progress bar, in cells.
const BAR_WIDTH: usize = 20;

/// Rendering options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Style {
    /// Emit ANSI bold for `**` segments.
    pub ansi: bool,
}

impl Style {
    pub const PLAIN: Style = Style { ansi: false };
    pub const ANSI: Style = Style { ansi: true };

    fn bold(&self, text: &str) -> String {
        if self.ansi {
            format!("\x1b[1m{text}\x1b[0m")
        } else {
            text.to_string()
        }
    }
}

// =============================================================================
// TRANSCRIPT
// =============================================================================

/// One message: a `who · time` header followed by its formatted lines.
pub fn render_message(message: &ChatMessage, style: Style) -> String {
    let who = match message.role {
        Role::User => "You",
        Role::Assistant => "Assistant",
    };
    let stamp = format_time(&message.timestamp.with_timezone(&Local));

    let mut out = format!("{} · {stamp}\n", style.bold(who));
    for line in format_message(&message.content) {
        out.push_str(&render_line(&line, style));
        out.push('\n');
    }
    out
}

fn render_line(line: &Line, style: Style) -> String {
    match line {
        Line::Blank => String::new(),
        Line::Rich(spans) => spans
            .iter()
            .map(|span| match span {
                Span::Text(text) => text.clone(),
                Span::Bold(text) => style.bold(text),
            })
            .collect(),
        Line::Bullet(text) => format!("  {}", text.trim_start()),
        Line::Plain(text) => text.clone(),
    }
}

// =============================================================================
// LOAN SUMMARY
// =============================================================================

pub fn render_summary(summary: &LoanSummary) -> String {
    let mut out = String::from("Loan Summary\n============\n");
    if let Some(name) = &summary.customer_name {
        out.push_str(&format!("Customer:      {name}\n"));
    }
    out.push_str(&format!("Loan Amount:   {}\n", summary.amount_label()));
    out.push_str(&format!("Tenure:        {}\n", summary.tenure_label()));
    out.push_str(&format!("Interest Rate: {}\n", summary.rate_label()));
    out.push_str(&format!("Monthly EMI:   {}\n", summary.emi_label()));
    out
}

// =============================================================================
// AGENT PANEL
// =============================================================================

/// `[#########-----------] 44%`
pub fn render_progress_bar(percent: u8) -> String {
    let filled = (percent.min(100) as usize).saturating_mul(BAR_WIDTH) / 100;
    format!(
        "[{}{}] {percent}%",
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH.saturating_sub(filled))
    )
}

/// Workflow progress, agent list and, when due, the approval card.
///
/// `download_hint` is shown under the approval card once a letter exists.
pub fn render_panel(
    progress: &StageProgress,
    sanction: Option<&SanctionInfo>,
    download_hint: &str,
) -> String {
    let mut out = format!("AI Workflow: {}\n", progress.label());
    out.push_str(&render_progress_bar(progress.percent));
    out.push_str("\n\nAgent Status\n");

    for view in &progress.agents {
        let suffix = match view.status {
            AgentStatus::Active => " (working)",
            AgentStatus::Completed | AgentStatus::Pending => "",
        };
        out.push_str(&format!(
            "  {} {} {:<20} {}{suffix}\n",
            view.status.marker(),
            view.agent.icon,
            view.agent.name,
            view.agent.description,
        ));
    }

    if progress.approval_visible {
        out.push_str("\n✅ Loan Approved!\n");
        out.push_str("Your sanction letter has been generated.\n");
        if let Some(info) = sanction {
            out.push_str(&format!(
                "Download sanction_{}.pdf: {download_hint}\n",
                info.sanction_id
            ));
        }
    }
    out
}
