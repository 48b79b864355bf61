//! Prompt templates for every stage of the flow.
//!
//! All model-facing and participant-facing wording lives here, so the
//! protocol code stays free of string literals and the texts can be
//! reviewed in one place.

/// Templates used by the single-party dialogue bots.
pub struct DialoguePrompts;

impl DialoguePrompts {
    /// System prompt seeding a leadership conversation.
    pub fn leadership_system() -> &'static str {
        "You are a leadership advisor helping executives make important decisions. \
         First understand their situation, then ask one clarifying question if needed, \
         and finally provide a comprehensive report."
    }

    /// System prompt seeding a stakeholder conversation around a shared report.
    pub fn team_member_system(member_name: &str, leadership_report: &str) -> String {
        format!(
            "You are facilitating a discussion with team member {} about the situation \
             described in this leadership report: {}\n\
             Your goal is to understand their perspective deeply and create a \
             comprehensive summary of their views.",
            member_name, leadership_report
        )
    }

    /// Inline request appended to a stakeholder's first input.
    pub fn clarifying_question_suffix() -> &'static str {
        "\n\nPlease provide one clarifying question to understand better my true \
         priorities and preferences."
    }

    /// Report instruction for the leadership round.
    pub fn leadership_report_prompt() -> &'static str {
        "Based on our discussion, please generate a really concise report that includes \
         the situation overview in one sentence.\n\
         Format it professionally for sharing with team members. Only include the \
         report, no headers or footers, and don't style the text."
    }

    /// Report instruction for a stakeholder round.
    pub fn team_member_report_prompt() -> &'static str {
        "Based on our discussion, please generate a comprehensive summary of the team \
         member's perspective that includes:\n\
         1. Key Points and Opinions\n\
         2. Main Concerns\n\
         3. Suggested Solutions\n\
         4. Additional Insights\n\
         Format it professionally for integration with other team members' feedback."
    }
}

/// Templates used by the round-robin discussion engine.
pub struct DiscussionPrompts;

impl DiscussionPrompts {
    /// Per-agent system prompt.
    pub fn agent_system(name: &str, role: &str, context: &str) -> String {
        format!(
            "You are {}, {}. {}. Provide a concise, complete thought in one sentence. \
             Do not continue a previous sentence. Ensure your response is a full, \
             grammatically complete sentence.",
            name, role, context
        )
    }

    /// Wrap the previous speaker's message into the current speaker's turn.
    pub fn turn_prompt(previous_message: &str) -> String {
        format!(
            "Previous context: {}. Provide your perspective in a single, complete sentence.",
            previous_message
        )
    }

    /// Opening prompt derived from the leadership report.
    pub fn initial_prompt(leadership_report: &str) -> String {
        format!(
            "The issue we need to resolve is described in this report: {}",
            leadership_report
        )
    }

    /// Closing summary request, answered once and shared with everyone.
    pub fn summary_prompt() -> &'static str {
        "The discussion is over. Summarize the discussion into three points, \
         covering the positions taken and where they converged or clashed."
    }

    /// Per-agent preparation request after the summary.
    pub fn preparation_prompt() -> &'static str {
        "Based on this discussion, tell your owner what they should prepare before \
         the next meeting: the arguments to sharpen, the questions to expect, and \
         the information to bring."
    }
}

/// Fixed participant-facing messages sent by the conversation stepper.
pub struct FlowMessages;

impl FlowMessages {
    pub fn ask_situation() -> &'static str {
        "Hi! I can help you think through a decision. What is the situation you are \
         facing? Feel free to describe it in your own words."
    }

    pub fn ask_recipients() -> &'static str {
        "Thanks. Who should weigh in on this? Mention them here (for example \
         <@U12345>) and I will reach out to each of them."
    }

    pub fn opinion_prompt(report: &str) -> String {
        format!(
            "A decision is being discussed and your perspective matters. Here is the \
             current report:\n\n{}\n\nWhat is your take on this? Reply here with your \
             opinion.",
            report
        )
    }

    pub fn report_filed_ack() -> &'static str {
        "Got it, your perspective is on file. I will get back to you once everyone \
         has weighed in."
    }
}
