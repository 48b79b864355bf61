//! Single-party dialogue bot.
//!
//! Wraps one conversation thread through the fixed four-step protocol:
//! collect input, ask one clarifying question, receive the answer, generate
//! a report. The steps are separate calls, not one blocking turn, so the
//! host can interleave them with inbound-message events; the bot is
//! resumable between any two stages.

use crate::ports::completion::{CompletionError, CompletionGateway, sentinel_reply};
use crate::ports::report_store::{ReportStore, StoreError};
use crate::util::now_timestamp;
use roundtable_domain::{BotProfile, ConversationThread, ProtocolError, ReportKey};
use std::sync::Arc;
use tracing::warn;

/// A single-persona conversational wrapper around one completion-backed
/// thread.
///
/// Completion failures never escape this boundary: the participant sees the
/// sentinel text as if it were a reply, and the degradation is logged.
pub struct DialogueBot {
    profile: BotProfile,
    thread: ConversationThread,
    gateway: Arc<dyn CompletionGateway>,
}

impl DialogueBot {
    pub fn new(profile: BotProfile, gateway: Arc<dyn CompletionGateway>) -> Self {
        Self {
            profile,
            thread: ConversationThread::new(),
            gateway,
        }
    }

    pub fn profile(&self) -> &BotProfile {
        &self.profile
    }

    pub fn thread(&self) -> &ConversationThread {
        &self.thread
    }

    /// Step 1: seed the thread with the persona and the participant's input.
    ///
    /// No completion call. Fails if the thread was already seeded.
    pub fn collect_initial_input(&mut self, text: &str) -> Result<(), ProtocolError> {
        if !self.thread.is_empty() {
            return Err(ProtocolError::AlreadySeeded);
        }
        self.thread = ConversationThread::with_system_prompt(self.profile.system_prompt());
        self.thread.push_user(self.profile.seed_input(text));
        Ok(())
    }

    /// Step 2: have the model ask one clarifying question.
    ///
    /// The reply (or the sentinel on failure) is appended as an assistant
    /// message and returned as user-visible text.
    pub async fn ask_clarifying_question(&mut self) -> String {
        let reply = self.degraded_completion("clarifying_question").await;
        self.thread.push_assistant(reply.clone());
        reply
    }

    /// Step 3: record the participant's answer. No completion call.
    pub fn handle_response(&mut self, text: &str) {
        self.thread.push_user(text);
    }

    /// Step 4: generate the report, persist it, and return its text.
    ///
    /// Exactly one artifact is written per call, keyed by the profile's
    /// report kind, the participant name, and the current timestamp. A
    /// degraded (sentinel) report is still persisted so the flow can
    /// proceed; store failures propagate.
    pub async fn generate_report(
        &mut self,
        store: &dyn ReportStore,
        participant_name: &str,
    ) -> Result<String, StoreError> {
        self.thread.push_user(self.profile.report_prompt());
        let report = self.degraded_completion("report").await;
        self.thread.push_assistant(report.clone());

        let key = ReportKey::new(self.profile.report_kind(), participant_name, now_timestamp());
        store.put(&key, &report).await?;
        Ok(report)
    }

    /// One completion call over the thread, degraded to the sentinel text
    /// on failure.
    async fn degraded_completion(&self, step: &'static str) -> String {
        match self.gateway.complete(self.thread.messages()).await {
            Ok(reply) => reply,
            Err(err) => {
                log_degradation(step, &err);
                sentinel_reply(&err)
            }
        }
    }
}

fn log_degradation(step: &str, err: &CompletionError) {
    warn!(step, error = %err, "completion degraded to sentinel reply");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{MemoryReportStore, ScriptedGateway};
    use roundtable_domain::{ReportKind, Role, is_well_formed_timestamp};

    fn scripted_bot(replies: &[&str]) -> DialogueBot {
        DialogueBot::new(
            BotProfile::Leadership,
            Arc::new(ScriptedGateway::with_replies(replies)),
        )
    }

    #[tokio::test]
    async fn test_protocol_happy_path() {
        let store = MemoryReportStore::new();
        let mut bot = scripted_bot(&["what is the deadline?", "the report text"]);

        bot.collect_initial_input("should we return to office?")
            .unwrap();
        let question = bot.ask_clarifying_question().await;
        assert_eq!(question, "what is the deadline?");
        bot.handle_response("no deadline yet");
        let report = bot.generate_report(&store, "lee").await.unwrap();
        assert_eq!(report, "the report text");

        // system, user, assistant, user, user (report prompt), assistant
        assert_eq!(bot.thread().len(), 6);
        assert_eq!(bot.thread().messages()[0].role, Role::System);
    }

    #[tokio::test]
    async fn test_collect_twice_is_a_state_error() {
        let mut bot = scripted_bot(&[]);
        bot.collect_initial_input("first").unwrap();
        assert!(matches!(
            bot.collect_initial_input("second"),
            Err(ProtocolError::AlreadySeeded)
        ));
    }

    #[tokio::test]
    async fn test_completion_failure_returns_sentinel() {
        let mut bot = DialogueBot::new(
            BotProfile::Leadership,
            Arc::new(ScriptedGateway::failing()),
        );
        bot.collect_initial_input("situation").unwrap();
        let question = bot.ask_clarifying_question().await;
        assert!(question.starts_with("I encountered an error:"));
        // The sentinel is part of the replayable thread.
        assert_eq!(bot.thread().len(), 3);
    }

    #[tokio::test]
    async fn test_seed_then_report_persists_one_artifact() {
        // Skipping clarification entirely still yields exactly one
        // well-formed persisted artifact.
        let store = MemoryReportStore::new();
        let mut bot = scripted_bot(&["the report text"]);
        bot.collect_initial_input("situation").unwrap();
        bot.generate_report(&store, "lee").await.unwrap();

        let keys = store.keys();
        assert_eq!(keys.len(), 1);
        assert_eq!(keys[0].kind, ReportKind::Leadership);
        assert!(is_well_formed_timestamp(&keys[0].timestamp));
        assert_eq!(
            store
                .latest_sync(ReportKind::Leadership, None)
                .as_deref(),
            Some("the report text")
        );
    }
}
