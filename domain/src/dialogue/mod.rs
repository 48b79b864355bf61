//! Bot profiles for the two flavors of single-party dialogue.
//!
//! Leadership and team-member bots run the same four-step protocol; the
//! profile is the configuration difference between them: persona, how the
//! first input is framed, and which report they produce.

use crate::prompt::DialoguePrompts;
use crate::report::ReportKind;

/// Persona and prompt configuration for one dialogue bot instance.
#[derive(Debug, Clone)]
pub enum BotProfile {
    /// Advises the leader through situation intake and recommendation.
    Leadership,
    /// Collects one stakeholder's perspective on the leadership report.
    TeamMember {
        member_name: String,
        leadership_report: String,
    },
}

impl BotProfile {
    pub fn team_member(
        member_name: impl Into<String>,
        leadership_report: impl Into<String>,
    ) -> Self {
        BotProfile::TeamMember {
            member_name: member_name.into(),
            leadership_report: leadership_report.into(),
        }
    }

    /// Which report artifact this bot's final step produces.
    pub fn report_kind(&self) -> ReportKind {
        match self {
            BotProfile::Leadership => ReportKind::Leadership,
            BotProfile::TeamMember { .. } => ReportKind::TeamMember,
        }
    }

    /// System message establishing the bot's persona and goal.
    pub fn system_prompt(&self) -> String {
        match self {
            BotProfile::Leadership => DialoguePrompts::leadership_system().to_string(),
            BotProfile::TeamMember {
                member_name,
                leadership_report,
            } => DialoguePrompts::team_member_system(member_name, leadership_report),
        }
    }

    /// Frame the participant's raw first input as the seed user message.
    ///
    /// The team-member flavor asks inline for one clarifying question, so
    /// the next completion call produces the question directly.
    pub fn seed_input(&self, raw: &str) -> String {
        match self {
            BotProfile::Leadership => raw.to_string(),
            BotProfile::TeamMember { .. } => {
                format!("{}{}", raw, DialoguePrompts::clarifying_question_suffix())
            }
        }
    }

    /// Instructional message requesting the final report.
    pub fn report_prompt(&self) -> &'static str {
        match self {
            BotProfile::Leadership => DialoguePrompts::leadership_report_prompt(),
            BotProfile::TeamMember { .. } => DialoguePrompts::team_member_report_prompt(),
        }
    }
}
