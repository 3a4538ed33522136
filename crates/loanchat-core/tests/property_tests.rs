//! # Property-Based Tests
//!
//! Invariants of the stage progress model, checked with proptest over the
//! full pipeline and over arbitrary (mostly unknown) stage strings.

use loanchat_core::{
    AGENTS, AgentStatus, Application, Stage, agent_status, approval_visible, progress_percentage,
    stage_index,
};
use proptest::prelude::*;

fn any_stage() -> impl Strategy<Value = Stage> {
    (0..Stage::COUNT).prop_map(|i| Stage::ALL[i])
}

// =============================================================================
// PROPERTY TESTS
// =============================================================================

proptest! {
    /// Status follows the pipeline order exactly.
    #[test]
    fn status_matches_ordering(current in any_stage(), agent in any_stage()) {
        let status = agent_status(current.as_str(), agent.as_str());
        let expected = if agent < current {
            AgentStatus::Completed
        } else if agent == current {
            AgentStatus::Active
        } else {
            AgentStatus::Pending
        };
        prop_assert_eq!(status, expected);
    }

    /// Exactly one agent per trigger stage can be active at a time.
    #[test]
    fn at_most_one_active_agent(current in any_stage()) {
        let active = AGENTS
            .iter()
            .filter(|a| agent_status(current.as_str(), a.trigger.as_str()) == AgentStatus::Active)
            .count();
        prop_assert!(active <= 1);
    }

    /// Progress never decreases as the stage advances.
    #[test]
    fn progress_is_monotonic(a in any_stage(), b in any_stage()) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(progress_percentage(lo.as_str()) <= progress_percentage(hi.as_str()));
    }

    /// Unknown stage strings never panic; progress is 0 and agents stay pending.
    #[test]
    fn unknown_current_stage_is_tolerated(raw in "[a-z_]{0,24}") {
        prop_assume!(Stage::parse(&raw).is_none());
        prop_assert_eq!(stage_index(&raw), -1);
        prop_assert_eq!(progress_percentage(&raw), 0);
        for agent in AGENTS {
            prop_assert_eq!(agent_status(&raw, agent.trigger.as_str()), AgentStatus::Pending);
        }
    }

    /// Approval shows only for approved loans at the last two stages.
    #[test]
    fn approval_gate(current in any_stage(), approved in any::<bool>()) {
        let app = Application { loan_approved: approved, ..Application::default() };
        let expected = approved && matches!(current, Stage::SanctionLetter | Stage::Close);
        prop_assert_eq!(approval_visible(current.as_str(), Some(&app)), expected);
    }
}

// =============================================================================
// FIXED POINTS
// =============================================================================

#[test]
fn progress_for_every_stage() {
    let expected = [11u8, 22, 33, 44, 56, 67, 78, 89, 100];
    for (stage, percent) in Stage::ALL.iter().zip(expected) {
        assert_eq!(progress_percentage(stage.as_str()), percent, "{stage}");
    }
}

#[test]
fn agent_roster_is_bound_to_pipeline_stages() {
    let triggers: Vec<_> = AGENTS.iter().map(|a| a.trigger).collect();
    assert_eq!(
        triggers,
        vec![
            Stage::Greeting,
            Stage::OfferPresentation,
            Stage::KycVerification,
            Stage::Underwriting,
            Stage::SanctionLetter,
        ]
    );
}
