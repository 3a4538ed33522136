//! # Stage Progress Model
//!
//! Maps the server-reported conversation stage onto the fixed loan pipeline.
//!
//! ## Pipeline
//!
//! | # | Stage | Label |
//! |---|-------|-------|
//! | 0 | `greeting` | Greeting |
//! | 1 | `intent_capture` | Intent Capture |
//! | 2 | `lead_qualification` | Lead Qualification |
//! | 3 | `offer_presentation` | Offer Presentation |
//! | 4 | `kyc_verification` | KYC Verification |
//! | 5 | `underwriting` | Underwriting |
//! | 6 | `decision` | Decision |
//! | 7 | `sanction_letter` | Sanction Letter |
//! | 8 | `close` | Close |
//!
//! The client never drives transitions. It only observes the stage string
//! the service returns and derives three facts from it: per-agent status,
//! overall completion percentage and whether the approval card is shown.
//!
//! ## Unknown Stages
//!
//! Stage strings outside the pipeline are tolerated. Their index resolves
//! to `-1` and the comparisons proceed arithmetically, so an unknown
//! current stage leaves every agent pending and reports 0% progress.

use crate::types::Application;
use serde::{Deserialize, Serialize};

/// Index used for stage strings that are not part of the pipeline.
pub const UNKNOWN_INDEX: i32 = -1;

// =============================================================================
// STAGE ENUM
// =============================================================================

/// A step of the loan conversation, in pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Greeting,
    IntentCapture,
    LeadQualification,
    OfferPresentation,
    KycVerification,
    Underwriting,
    Decision,
    SanctionLetter,
    Close,
}

impl Stage {
    /// Every stage, in pipeline order.
    pub const ALL: [Stage; 9] = [
        Stage::Greeting,
        Stage::IntentCapture,
        Stage::LeadQualification,
        Stage::OfferPresentation,
        Stage::KycVerification,
        Stage::Underwriting,
        Stage::Decision,
        Stage::SanctionLetter,
        Stage::Close,
    ];

    /// Length of the pipeline.
    pub const COUNT: usize = Self::ALL.len();

    /// Position of this stage in the pipeline (0-based).
    #[must_use]
    pub const fn ordinal(self) -> usize {
        match self {
            Stage::Greeting => 0,
            Stage::IntentCapture => 1,
            Stage::LeadQualification => 2,
            Stage::OfferPresentation => 3,
            Stage::KycVerification => 4,
            Stage::Underwriting => 5,
            Stage::Decision => 6,
            Stage::SanctionLetter => 7,
            Stage::Close => 8,
        }
    }

    /// Wire name, as the service spells it.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Stage::Greeting => "greeting",
            Stage::IntentCapture => "intent_capture",
            Stage::LeadQualification => "lead_qualification",
            Stage::OfferPresentation => "offer_presentation",
            Stage::KycVerification => "kyc_verification",
            Stage::Underwriting => "underwriting",
            Stage::Decision => "decision",
            Stage::SanctionLetter => "sanction_letter",
            Stage::Close => "close",
        }
    }

    /// Human-readable label for headers.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Stage::Greeting => "Greeting",
            Stage::IntentCapture => "Intent Capture",
            Stage::LeadQualification => "Lead Qualification",
            Stage::OfferPresentation => "Offer Presentation",
            Stage::KycVerification => "KYC Verification",
            Stage::Underwriting => "Underwriting",
            Stage::Decision => "Decision",
            Stage::SanctionLetter => "Sanction Letter",
            Stage::Close => "Close",
        }
    }

    /// Parse a wire name. Unknown names yield `None`, never an error.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Stage> {
        Self::ALL.into_iter().find(|stage| stage.as_str() == raw)
    }

    /// `close` ends the conversation; input is disabled from then on.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Stage::Close)
    }

    /// Stages at which an approved loan shows the approval card.
    #[must_use]
    pub const fn reveals_approval(self) -> bool {
        matches!(self, Stage::SanctionLetter | Stage::Close)
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pipeline index of a raw stage string, `-1` when it is not in the pipeline.
#[must_use]
pub fn stage_index(raw: &str) -> i32 {
    index_of(Stage::parse(raw))
}

fn index_of(stage: Option<Stage>) -> i32 {
    stage.map_or(UNKNOWN_INDEX, |s| s.ordinal() as i32)
}

/// Display label for any stage string.
///
/// Known stages use [`Stage::label`]. Anything else has its first underscore
/// replaced by a space and each word capitalised, with `kyc` upper-cased.
#[must_use]
pub fn stage_label(raw: &str) -> String {
    if let Some(stage) = Stage::parse(raw) {
        return stage.label().to_string();
    }

    raw.replacen('_', " ", 1)
        .split(' ')
        .map(|word| {
            if word.eq_ignore_ascii_case("kyc") {
                return "KYC".to_string();
            }
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

// =============================================================================
// AGENTS
// =============================================================================

/// Where an agent sits relative to the current stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentStatus {
    Completed,
    Active,
    Pending,
}

impl AgentStatus {
    /// Single-glyph marker for compact panels.
    #[must_use]
    pub const fn marker(self) -> &'static str {
        match self {
            AgentStatus::Completed => "✓",
            AgentStatus::Active => "⚡",
            AgentStatus::Pending => "○",
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            AgentStatus::Completed => "completed",
            AgentStatus::Active => "active",
            AgentStatus::Pending => "pending",
        }
    }
}

impl std::fmt::Display for AgentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named indicator bound to the pipeline stage it watches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Agent {
    pub id: u8,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub trigger: Stage,
}

/// The fixed agent roster, in display order.
pub const AGENTS: [Agent; 5] = [
    Agent {
        id: 1,
        name: "Master Agent",
        description: "Orchestrating Workflow",
        icon: "🎯",
        trigger: Stage::Greeting,
    },
    Agent {
        id: 2,
        name: "Sales Agent",
        description: "Processing Offer",
        icon: "💼",
        trigger: Stage::OfferPresentation,
    },
    Agent {
        id: 3,
        name: "Verification Agent",
        description: "KYC Verification",
        icon: "🔍",
        trigger: Stage::KycVerification,
    },
    Agent {
        id: 4,
        name: "Underwriting Agent",
        description: "Risk Assessment",
        icon: "📊",
        trigger: Stage::Underwriting,
    },
    Agent {
        id: 5,
        name: "Sanction Agent",
        description: "Letter Generation",
        icon: "📄",
        trigger: Stage::SanctionLetter,
    },
];

// =============================================================================
// DERIVED FACTS
// =============================================================================

/// Status of an agent whose trigger is `agent` while the pipeline is at `current`.
///
/// Both arguments are raw stage strings; either may be unknown.
#[must_use]
pub fn agent_status(current: &str, agent: &str) -> AgentStatus {
    agent_status_of(Stage::parse(current), Stage::parse(agent))
}

/// Typed form of [`agent_status`]. `None` stands for an unknown stage.
///
/// An unknown agent stage is always pending, even though its `-1` index
/// would compare as completed. An unknown current stage compares as index
/// `-1`, which leaves every known agent pending.
#[must_use]
pub fn agent_status_of(current: Option<Stage>, agent: Option<Stage>) -> AgentStatus {
    let Some(agent) = agent else {
        return AgentStatus::Pending;
    };
    let current_index = index_of(current);
    let agent_index = agent.ordinal() as i32;

    if agent_index < current_index {
        AgentStatus::Completed
    } else if agent_index == current_index {
        AgentStatus::Active
    } else {
        AgentStatus::Pending
    }
}

/// Completion percentage, `round((index + 1) / COUNT * 100)`; 0 when unknown.
#[must_use]
pub fn progress_percentage(current: &str) -> u8 {
    match Stage::parse(current) {
        Some(stage) => percent_through(stage),
        None => 0,
    }
}

/// Round-half-up of `(ordinal + 1) * 100 / COUNT`, in integers.
fn percent_through(stage: Stage) -> u8 {
    let reached = stage.ordinal().saturating_add(1);
    let doubled = reached.saturating_mul(200).saturating_add(Stage::COUNT);
    (doubled / Stage::COUNT.saturating_mul(2)).min(100) as u8
}

/// Whether the approval card (and its download link) may be shown.
#[must_use]
pub fn approval_visible(current: &str, application: Option<&Application>) -> bool {
    let stage_allows = Stage::parse(current).is_some_and(Stage::reveals_approval);
    stage_allows && application.is_some_and(|app| app.loan_approved)
}

// =============================================================================
// STAGE PROGRESS SNAPSHOT
// =============================================================================

/// One agent with its status at the observed stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentView {
    pub agent: Agent,
    pub status: AgentStatus,
}

/// Everything the progress panel shows for one observed stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageProgress {
    /// The raw stage string as reported.
    pub current: String,
    /// Parsed stage, `None` when the service reported something unknown.
    pub stage: Option<Stage>,
    pub percent: u8,
    pub agents: Vec<AgentView>,
    pub approval_visible: bool,
}

impl StageProgress {
    /// Derive the panel state from the current stage and mirrored application.
    #[must_use]
    pub fn observe(current: &str, application: Option<&Application>) -> Self {
        let stage = Stage::parse(current);
        let agents = AGENTS
            .iter()
            .map(|agent| AgentView {
                agent: *agent,
                status: agent_status_of(stage, Some(agent.trigger)),
            })
            .collect();

        Self {
            current: current.to_string(),
            stage,
            percent: progress_percentage(current),
            agents,
            approval_visible: approval_visible(current, application),
        }
    }

    /// Label for the header, tolerant of unknown stages.
    #[must_use]
    pub fn label(&self) -> String {
        stage_label(&self.current)
    }

    /// Number of agents whose stage has already passed.
    #[must_use]
    pub fn completed_agents(&self) -> usize {
        self.agents
            .iter()
            .filter(|view| view.status == AgentStatus::Completed)
            .count()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn approved() -> Application {
        Application {
            loan_approved: true,
            ..Application::default()
        }
    }

    #[test]
    fn stage_ordering_matches_ordinals() {
        for pair in Stage::ALL.windows(2) {
            assert!(pair[0] < pair[1]);
            assert_eq!(pair[0].ordinal().saturating_add(1), pair[1].ordinal());
        }
    }

    #[test]
    fn parse_round_trips_every_wire_name() {
        for stage in Stage::ALL {
            assert_eq!(Stage::parse(stage.as_str()), Some(stage));
        }
        assert_eq!(Stage::parse("GREETING"), None);
        assert_eq!(Stage::parse(""), None);
    }

    #[test]
    fn agent_status_around_underwriting() {
        assert_eq!(
            agent_status("underwriting", "kyc_verification"),
            AgentStatus::Completed
        );
        assert_eq!(agent_status("underwriting", "underwriting"), AgentStatus::Active);
        assert_eq!(
            agent_status("underwriting", "sanction_letter"),
            AgentStatus::Pending
        );
    }

    #[test]
    fn unknown_current_stage_leaves_agents_pending() {
        for agent in AGENTS {
            assert_eq!(
                agent_status("future_stage", agent.trigger.as_str()),
                AgentStatus::Pending
            );
        }
    }

    #[test]
    fn unknown_agent_stage_never_completes_or_activates() {
        for stage in Stage::ALL {
            assert_eq!(
                agent_status(stage.as_str(), "not_a_stage"),
                AgentStatus::Pending
            );
        }
        assert_eq!(agent_status("nope", "not_a_stage"), AgentStatus::Pending);
    }

    #[test]
    fn progress_endpoints() {
        assert_eq!(progress_percentage("greeting"), 11);
        assert_eq!(progress_percentage("kyc_verification"), 56);
        assert_eq!(progress_percentage("close"), 100);
        assert_eq!(progress_percentage("???"), 0);
    }

    #[test]
    fn approval_requires_stage_and_approval() {
        let yes = approved();
        let no = Application::default();
        assert!(approval_visible("sanction_letter", Some(&yes)));
        assert!(approval_visible("close", Some(&yes)));
        assert!(!approval_visible("decision", Some(&yes)));
        assert!(!approval_visible("close", Some(&no)));
        assert!(!approval_visible("close", None));
    }

    #[test]
    fn labels() {
        assert_eq!(stage_label("kyc_verification"), "KYC Verification");
        assert_eq!(stage_label("intent_capture"), "Intent Capture");
        assert_eq!(stage_label("kyc_re_check"), "KYC Re_check");
        assert_eq!(stage_label("appeal"), "Appeal");
    }

    #[test]
    fn observe_builds_full_panel() {
        let progress = StageProgress::observe("decision", Some(&approved()));
        assert_eq!(progress.stage, Some(Stage::Decision));
        assert_eq!(progress.percent, 78);
        assert_eq!(progress.agents.len(), AGENTS.len());
        assert_eq!(progress.completed_agents(), 4);
        assert_eq!(progress.agents[4].status, AgentStatus::Pending);
        assert!(!progress.approval_visible);
        assert_eq!(progress.label(), "Decision");
    }
}
