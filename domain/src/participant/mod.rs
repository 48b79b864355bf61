//! Participant identity and the per-participant protocol stages.

pub mod mentions;

mod value_objects;

pub use value_objects::{ChannelId, ParticipantId};

use serde::{Deserialize, Serialize};

/// Where a participant stands in the clarify-and-report protocol.
///
/// The stage is the sole driver of branching when an inbound message
/// arrives. Stages advance strictly forward; `ReadyForDiscussion` is the
/// barrier stage gating the multi-agent discussion launch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    /// First contact, nothing collected yet.
    New,
    /// Leader was prompted for the decision situation.
    AwaitingSituation,
    /// Leader was asked one clarifying question about the situation.
    AwaitingSituationClarification,
    /// Leader was asked who should weigh in.
    AwaitingRecipients,
    /// Stakeholder received the leadership report and was asked for an opinion.
    AwaitingOpinion,
    /// Stakeholder was asked one clarifying question about their opinion.
    AwaitingOpinionClarification,
    /// Stakeholder's report is filed; waiting for everyone else.
    ReadyForDiscussion,
}

impl Stage {
    /// Whether this participant has crossed the discussion barrier.
    pub fn is_ready_for_discussion(&self) -> bool {
        matches!(self, Stage::ReadyForDiscussion)
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::New => "new",
            Stage::AwaitingSituation => "awaiting_situation",
            Stage::AwaitingSituationClarification => "awaiting_situation_clarification",
            Stage::AwaitingRecipients => "awaiting_recipients",
            Stage::AwaitingOpinion => "awaiting_opinion",
            Stage::AwaitingOpinionClarification => "awaiting_opinion_clarification",
            Stage::ReadyForDiscussion => "ready_for_discussion",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_barrier_stage_is_ready() {
        assert!(Stage::ReadyForDiscussion.is_ready_for_discussion());
        assert!(!Stage::New.is_ready_for_discussion());
        assert!(!Stage::AwaitingOpinionClarification.is_ready_for_discussion());
    }
}
