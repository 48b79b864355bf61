//! Conversation stepper.
//!
//! One coordinator owns the participant registry and processes one inbound
//! event to completion at a time. The participant's stage is the sole
//! driver of branching; each stage handler performs its bot work, advances
//! the stage, then delivers text. When the last participant crosses the
//! barrier the discussion engine is constructed from everyone's reports and
//! run to completion, with its events routed back through the delivery
//! layer.

use crate::bots::DialogueBot;
use crate::events::{FileRef, InboundEvent};
use crate::ports::completion::CompletionGateway;
use crate::ports::delivery::{ChatDelivery, DeliveryError};
use crate::ports::extraction::{DocumentExtractor, ExtractionError};
use crate::ports::report_store::{ReportStore, StoreError};
use crate::ports::transcript_logger::{NoTranscriptLogger, TranscriptEvent, TranscriptLogger};
use crate::ports::transcription::{SpeechTranscriber, TranscriptionError};
use crate::registry::{ParticipantRegistry, SessionState};
use crate::use_cases::run_discussion::DiscussionEngine;
use crate::util::{now_timestamp, truncate_str};
use roundtable_domain::{
    BotProfile, ChannelId, DiscussionAgent, DiscussionConfig, DiscussionEvent, DiscussionPrompts,
    FlowMessages, ParticipantId, ProtocolError, ReportKind, Stage, extract_recipients,
};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that abort handling of one inbound event.
///
/// Aborting never advances the participant's stage past the failed action
/// and never corrupts the registry; the next event is handled normally.
#[derive(Error, Debug)]
pub enum CoordinatorError {
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error("Report store error: {0}")]
    Store(#[from] StoreError),

    #[error("Delivery error: {0}")]
    Delivery(#[from] DeliveryError),

    #[error("Transcription error: {0}")]
    Transcription(#[from] TranscriptionError),

    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Voice message received but no transcriber is configured")]
    TranscriberUnavailable,

    #[error("Document received but no extractor is configured")]
    ExtractorUnavailable,
}

/// Orchestrates the whole flow: session stepping, report fan-out, barrier
/// detection, and discussion routing.
pub struct Coordinator {
    gateway: Arc<dyn CompletionGateway>,
    delivery: Arc<dyn ChatDelivery>,
    store: Arc<dyn ReportStore>,
    transcriber: Option<Arc<dyn SpeechTranscriber>>,
    extractor: Option<Arc<dyn DocumentExtractor>>,
    transcript: Arc<dyn TranscriptLogger>,
    registry: ParticipantRegistry,
    discussion: DiscussionConfig,
    language: String,
}

impl Coordinator {
    pub fn new(
        gateway: Arc<dyn CompletionGateway>,
        delivery: Arc<dyn ChatDelivery>,
        store: Arc<dyn ReportStore>,
    ) -> Self {
        Self {
            gateway,
            delivery,
            store,
            transcriber: None,
            extractor: None,
            transcript: Arc::new(NoTranscriptLogger),
            registry: ParticipantRegistry::new(),
            discussion: DiscussionConfig::default(),
            language: "en".to_string(),
        }
    }

    pub fn with_transcriber(mut self, transcriber: Arc<dyn SpeechTranscriber>) -> Self {
        self.transcriber = Some(transcriber);
        self
    }

    pub fn with_extractor(mut self, extractor: Arc<dyn DocumentExtractor>) -> Self {
        self.extractor = Some(extractor);
        self
    }

    pub fn with_transcript_logger(mut self, logger: Arc<dyn TranscriptLogger>) -> Self {
        self.transcript = logger;
        self
    }

    pub fn with_discussion_config(mut self, config: DiscussionConfig) -> Self {
        self.discussion = config;
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn registry(&self) -> &ParticipantRegistry {
        &self.registry
    }

    /// Process one inbound event to completion.
    pub async fn handle_event(&mut self, event: InboundEvent) -> Result<(), CoordinatorError> {
        let text = self.resolve_attachments(&event).await?;
        self.ensure_session(&event.participant, event.thread_anchor.clone())
            .await?;

        let stage = self
            .registry
            .get(&event.participant)
            .map(|s| s.stage)
            .expect("session ensured above");
        debug!(participant = %event.participant, %stage, "dispatching inbound event");

        match stage {
            Stage::New => self.on_new(&event.participant).await,
            Stage::AwaitingSituation => self.on_situation(&event.participant, &text).await,
            Stage::AwaitingSituationClarification => {
                self.on_situation_clarification(&event.participant, &text).await
            }
            Stage::AwaitingRecipients => self.on_recipients(&event.participant, &text).await,
            Stage::AwaitingOpinion => self.on_opinion(&event.participant, &text).await,
            Stage::AwaitingOpinionClarification => {
                self.on_opinion_clarification(&event.participant, &text).await
            }
            Stage::ReadyForDiscussion => {
                debug!(participant = %event.participant, "message after barrier; ignoring");
                Ok(())
            }
        }
    }

    /// Fold attached files into the event text.
    ///
    /// Transcription and extraction failures are hard errors; there is no
    /// meaningful text proxy for them.
    async fn resolve_attachments(&self, event: &InboundEvent) -> Result<String, CoordinatorError> {
        let mut text = event.text.clone();
        for file in &event.files {
            match file {
                FileRef::Audio(audio) => {
                    let transcriber = self
                        .transcriber
                        .as_ref()
                        .ok_or(CoordinatorError::TranscriberUnavailable)?;
                    let transcribed = transcriber.transcribe(audio, &self.language).await?;
                    if text.trim().is_empty() {
                        text = transcribed;
                    } else {
                        text = format!("{}\n{}", text, transcribed);
                    }
                }
                FileRef::Document { url } => {
                    let extractor = self
                        .extractor
                        .as_ref()
                        .ok_or(CoordinatorError::ExtractorUnavailable)?;
                    let extracted = extractor.extract_text(url).await?;
                    text = format!("{}\n\nAttached document:\n{}", text, extracted);
                }
            }
        }
        Ok(text)
    }

    /// Create the session on first contact: open the DM channel and resolve
    /// the display name. Name resolution degrades to the raw id.
    async fn ensure_session(
        &mut self,
        id: &ParticipantId,
        thread_anchor: Option<String>,
    ) -> Result<(), CoordinatorError> {
        if let Some(session) = self.registry.get_mut(id) {
            if thread_anchor.is_some() {
                session.thread_anchor = thread_anchor;
            }
            return Ok(());
        }

        let channel = self.delivery.open_direct_channel(id).await?;
        let display_name = match self.delivery.resolve_display_name(id).await {
            Ok(name) => name,
            Err(err) => {
                warn!(participant = %id, error = %err, "could not resolve display name");
                id.to_string()
            }
        };

        let mut state = SessionState::new(id.clone(), display_name, channel);
        state.thread_anchor = thread_anchor;
        self.registry.insert(state);
        Ok(())
    }

    async fn on_new(&mut self, id: &ParticipantId) -> Result<(), CoordinatorError> {
        self.registry.set_leader(id.clone());

        let session = self.registry.get_mut(id).expect("session ensured");
        session.bot = Some(DialogueBot::new(
            BotProfile::Leadership,
            self.gateway.clone(),
        ));
        self.advance(id, Stage::AwaitingSituation);

        self.reply(id, FlowMessages::ask_situation()).await
    }

    async fn on_situation(
        &mut self,
        id: &ParticipantId,
        text: &str,
    ) -> Result<(), CoordinatorError> {
        let question = {
            let session = self.registry.get_mut(id).expect("session ensured");
            let bot = session
                .bot
                .as_mut()
                .ok_or_else(|| no_bot(Stage::AwaitingSituation))?;
            bot.collect_initial_input(text)?;
            bot.ask_clarifying_question().await
        };
        self.advance(id, Stage::AwaitingSituationClarification);

        self.reply(id, &question).await
    }

    async fn on_situation_clarification(
        &mut self,
        id: &ParticipantId,
        text: &str,
    ) -> Result<(), CoordinatorError> {
        {
            let session = self.registry.get_mut(id).expect("session ensured");
            let bot = session
                .bot
                .as_mut()
                .ok_or_else(|| no_bot(Stage::AwaitingSituationClarification))?;
            bot.handle_response(text);
        }
        self.advance(id, Stage::AwaitingRecipients);

        self.reply(id, FlowMessages::ask_recipients()).await
    }

    async fn on_recipients(
        &mut self,
        id: &ParticipantId,
        text: &str,
    ) -> Result<(), CoordinatorError> {
        let display_name = self
            .registry
            .get(id)
            .map(|s| s.display_name.clone())
            .expect("session ensured");

        let report = {
            let session = self.registry.get_mut(id).expect("session ensured");
            let bot = session
                .bot
                .as_mut()
                .ok_or_else(|| no_bot(Stage::AwaitingRecipients))?;
            bot.generate_report(self.store.as_ref(), &display_name)
                .await?
        };
        info!(leader = %display_name, "leadership report generated");

        let recipients = extract_recipients(text, id);
        self.transcript.log(TranscriptEvent::new(
            "fan_out",
            serde_json::json!({
                "leader": display_name,
                "recipients": recipients.iter().map(|r| r.as_str()).collect::<Vec<_>>(),
            }),
        ));

        // One failed delivery must not abort the loop over the remaining
        // recipients.
        for recipient in &recipients {
            if let Err(err) = self.fan_out_to(recipient, &report).await {
                warn!(recipient = %recipient, error = %err, "fan-out to recipient failed");
            }
        }
        Ok(())
    }

    /// Enroll one recipient in the stakeholder round and DM them the report.
    async fn fan_out_to(
        &mut self,
        recipient: &ParticipantId,
        report: &str,
    ) -> Result<(), CoordinatorError> {
        self.ensure_session(recipient, None).await?;

        {
            let session = self.registry.get_mut(recipient).expect("session ensured");
            // The leadership bot (for the leader) or nothing (for a fresh
            // recipient) is replaced by the team-member bot once their
            // opinion arrives.
            session.bot = None;
        }
        self.advance(recipient, Stage::AwaitingOpinion);

        self.reply(recipient, &FlowMessages::opinion_prompt(report))
            .await
    }

    async fn on_opinion(
        &mut self,
        id: &ParticipantId,
        text: &str,
    ) -> Result<(), CoordinatorError> {
        let leadership_report = self
            .store
            .latest(ReportKind::Leadership, None)
            .await?
            .ok_or_else(|| ProtocolError::MissingReport {
                kind: ReportKind::Leadership,
                participant: String::new(),
            })?;

        let display_name = self
            .registry
            .get(id)
            .map(|s| s.display_name.clone())
            .expect("session ensured");

        let mut bot = DialogueBot::new(
            BotProfile::team_member(&display_name, &leadership_report),
            self.gateway.clone(),
        );
        bot.collect_initial_input(text)?;
        let question = bot.ask_clarifying_question().await;

        let session = self.registry.get_mut(id).expect("session ensured");
        session.bot = Some(bot);
        self.advance(id, Stage::AwaitingOpinionClarification);

        self.reply(id, &question).await
    }

    async fn on_opinion_clarification(
        &mut self,
        id: &ParticipantId,
        text: &str,
    ) -> Result<(), CoordinatorError> {
        let display_name = self
            .registry
            .get(id)
            .map(|s| s.display_name.clone())
            .expect("session ensured");

        {
            let session = self.registry.get_mut(id).expect("session ensured");
            let bot = session
                .bot
                .as_mut()
                .ok_or_else(|| no_bot(Stage::AwaitingOpinionClarification))?;
            bot.handle_response(text);
            bot.generate_report(self.store.as_ref(), &display_name)
                .await?;
        }
        info!(participant = %display_name, "team-member report filed");
        self.advance(id, Stage::ReadyForDiscussion);

        // The acknowledgement is best-effort; a failed DM must not block the
        // barrier check.
        if let Err(err) = self.reply(id, FlowMessages::report_filed_ack()).await {
            warn!(participant = %id, error = %err, "could not acknowledge report");
        }

        self.maybe_launch().await
    }

    /// Launch the discussion when the barrier holds and the claim is won.
    ///
    /// The claim is the atomic part: re-checks from later transitions see it
    /// taken and return without a second launch.
    async fn maybe_launch(&mut self) -> Result<(), CoordinatorError> {
        if !self.registry.all_ready() || !self.registry.try_claim_launch() {
            return Ok(());
        }
        info!(
            participants = self.registry.len(),
            "discussion barrier satisfied; launching"
        );
        self.transcript.log(TranscriptEvent::new(
            "discussion_launched",
            serde_json::json!({ "participants": self.registry.len() }),
        ));
        self.run_discussion().await
    }

    async fn run_discussion(&mut self) -> Result<(), CoordinatorError> {
        let leadership_report = self
            .store
            .latest(ReportKind::Leadership, None)
            .await?
            .ok_or_else(|| ProtocolError::MissingReport {
                kind: ReportKind::Leadership,
                participant: String::new(),
            })?;

        // One agent per participant, seated in registration order.
        let mut agents = Vec::new();
        let mut dm_channels: HashMap<String, ChannelId> = HashMap::new();
        for session in self.registry.iter_in_order() {
            let report = self
                .store
                .latest(ReportKind::TeamMember, Some(&session.display_name))
                .await?
                .ok_or_else(|| ProtocolError::MissingReport {
                    kind: ReportKind::TeamMember,
                    participant: session.display_name.clone(),
                })?;
            agents.push(DiscussionAgent::new(
                &session.display_name,
                format!("representing {}'s perspective", session.display_name),
                report,
            ));
            dm_channels.insert(session.display_name.clone(), session.channel.clone());
        }

        // Degrade to DM-only routing when the broadcast channel cannot be
        // created; the discussion itself must still run.
        let name = format!("decision-discussion-{}", now_timestamp().to_lowercase());
        let broadcast = match self.delivery.create_broadcast_channel(&name).await {
            Ok(channel) => Some(channel),
            Err(err) => {
                warn!(error = %err, "no broadcast channel; routing discussion to DMs only");
                None
            }
        };

        let engine = DiscussionEngine::new(self.gateway.clone(), agents, self.discussion.clone())?;
        let mut events = engine.spawn(DiscussionPrompts::initial_prompt(&leadership_report));

        while let Some(event) = events.recv().await {
            self.log_discussion_event(&event);
            self.route_discussion_event(&event, broadcast.as_ref(), &dm_channels)
                .await;
        }
        info!("discussion routed to all participants");
        Ok(())
    }

    /// Route one engine event. Failures are isolated per destination.
    async fn route_discussion_event(
        &self,
        event: &DiscussionEvent,
        broadcast: Option<&ChannelId>,
        dm_channels: &HashMap<String, ChannelId>,
    ) {
        let (channel, text) = match event {
            DiscussionEvent::Turn {
                agent_name,
                response,
                ..
            } => {
                let Some(channel) = broadcast else {
                    return;
                };
                (channel, format!("*{}*: {}", agent_name, response))
            }
            DiscussionEvent::Summary {
                agent_name,
                summary,
            } => {
                let Some(channel) = dm_channels.get(agent_name) else {
                    return;
                };
                (channel, format!("Here is where the discussion landed:\n{}", summary))
            }
            DiscussionEvent::Preparation {
                agent_name,
                preparation,
            } => {
                let Some(channel) = dm_channels.get(agent_name) else {
                    return;
                };
                (
                    channel,
                    format!("To prepare for the next meeting:\n{}", preparation),
                )
            }
        };

        if let Err(err) = self.delivery.send(channel, &text, None).await {
            warn!(%channel, error = %err, "discussion event delivery failed");
        }
    }

    fn log_discussion_event(&self, event: &DiscussionEvent) {
        let payload = match event {
            DiscussionEvent::Turn {
                turn_index,
                agent_name,
                response,
            } => serde_json::json!({
                "turn": turn_index,
                "agent": agent_name,
                "response": truncate_str(response, 200),
            }),
            DiscussionEvent::Summary { agent_name, .. } => {
                serde_json::json!({ "agent": agent_name, "kind": "summary" })
            }
            DiscussionEvent::Preparation { agent_name, .. } => {
                serde_json::json!({ "agent": agent_name, "kind": "preparation" })
            }
        };
        self.transcript
            .log(TranscriptEvent::new("discussion_event", payload));
    }

    /// Record a stage transition on the session and in the transcript.
    fn advance(&mut self, id: &ParticipantId, to: Stage) {
        let session = self.registry.get_mut(id).expect("session ensured");
        let from = session.stage;
        session.stage = to;
        self.transcript.log(TranscriptEvent::new(
            "stage_transition",
            serde_json::json!({
                "participant": id.as_str(),
                "from": from.to_string(),
                "to": to.to_string(),
            }),
        ));
    }

    /// DM a participant on their session channel, inside their thread when
    /// one is anchored.
    async fn reply(&self, id: &ParticipantId, text: &str) -> Result<(), CoordinatorError> {
        let session = self.registry.get(id).expect("session ensured");
        self.delivery
            .send(
                &session.channel,
                text,
                session.thread_anchor.as_deref(),
            )
            .await?;
        Ok(())
    }
}

fn no_bot(stage: Stage) -> ProtocolError {
    ProtocolError::NoBotAttached {
        stage: stage.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::transcription::AudioRef;
    use crate::test_support::{MemoryReportStore, RecordingDelivery, ScriptedGateway};

    const LEADER: &str = "UAAA";
    const MEMBER_B: &str = "UBBB";
    const MEMBER_C: &str = "UCCC";

    fn event(id: &str, text: &str) -> InboundEvent {
        InboundEvent::text_only(ParticipantId::new(id), text)
    }

    fn coordinator(
        delivery: Arc<RecordingDelivery>,
        store: Arc<MemoryReportStore>,
    ) -> Coordinator {
        Coordinator::new(Arc::new(ScriptedGateway::echoing()), delivery, store)
    }

    /// Walk the leader from first contact through recipient fan-out.
    async fn drive_leader_round(coordinator: &mut Coordinator) {
        let mentions = format!("loop in <@{}> and <@{}>", MEMBER_B, MEMBER_C);
        for text in [
            "hi",
            "should we return to office?",
            "the deadline is friday",
            mentions.as_str(),
        ] {
            coordinator
                .handle_event(event(LEADER, text))
                .await
                .unwrap();
        }
    }

    /// Walk one stakeholder through opinion and clarification.
    async fn drive_member_round(coordinator: &mut Coordinator, id: &str) {
        coordinator
            .handle_event(event(id, "here is my opinion"))
            .await
            .unwrap();
        coordinator
            .handle_event(event(id, "and my clarification"))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_full_three_participant_flow() {
        let delivery = Arc::new(RecordingDelivery::new());
        let store = Arc::new(MemoryReportStore::new());
        let mut coordinator = coordinator(delivery.clone(), store.clone());

        drive_leader_round(&mut coordinator).await;

        // One leadership report persisted; B and C each received a DM
        // containing its text.
        assert_eq!(store.count(ReportKind::Leadership), 1);
        let report = store
            .latest_sync(ReportKind::Leadership, None)
            .expect("leadership report persisted");
        for member in [MEMBER_B, MEMBER_C] {
            let dms = delivery.dm_texts(member);
            assert_eq!(dms.len(), 1);
            assert!(dms[0].contains(&report));
        }

        // All three (leader included) are walked through the stakeholder
        // round; the barrier holds until the last one files.
        drive_member_round(&mut coordinator, MEMBER_B).await;
        assert!(!coordinator.registry().discussion_launched());
        drive_member_round(&mut coordinator, MEMBER_C).await;
        assert!(!coordinator.registry().discussion_launched());
        drive_member_round(&mut coordinator, LEADER).await;

        assert!(coordinator.registry().discussion_launched());
        assert_eq!(store.count(ReportKind::TeamMember), 3);

        // 6 turn events on the broadcast channel, one summary and one
        // preparation DM per participant.
        assert_eq!(delivery.broadcast_channel_count(), 1);
        assert_eq!(delivery.broadcast_texts().len(), 6);
        for id in [LEADER, MEMBER_B, MEMBER_C] {
            let dms = delivery.dm_texts(id);
            assert_eq!(
                dms.iter()
                    .filter(|t| t.starts_with("Here is where the discussion landed:"))
                    .count(),
                1
            );
            assert_eq!(
                dms.iter()
                    .filter(|t| t.starts_with("To prepare for the next meeting:"))
                    .count(),
                1
            );
        }
    }

    #[tokio::test]
    async fn test_barrier_fires_exactly_once() {
        let delivery = Arc::new(RecordingDelivery::new());
        let store = Arc::new(MemoryReportStore::new());
        let mut coordinator = coordinator(delivery.clone(), store.clone());

        drive_leader_round(&mut coordinator).await;
        for id in [MEMBER_B, MEMBER_C, LEADER] {
            drive_member_round(&mut coordinator, id).await;
        }
        assert_eq!(delivery.broadcast_channel_count(), 1);

        // A stray message after the barrier re-checks the claim but never
        // launches a second discussion.
        coordinator
            .handle_event(event(MEMBER_B, "did I miss anything?"))
            .await
            .unwrap();
        assert_eq!(delivery.broadcast_channel_count(), 1);
        assert_eq!(delivery.broadcast_texts().len(), 6);
    }

    #[tokio::test]
    async fn test_fan_out_isolates_one_failing_recipient() {
        let delivery = Arc::new(RecordingDelivery::new().fail_open_for(MEMBER_C));
        let store = Arc::new(MemoryReportStore::new());
        let mut coordinator = coordinator(delivery.clone(), store.clone());

        drive_leader_round(&mut coordinator).await;

        // C's DM channel could not be opened; B still got the report.
        assert_eq!(delivery.dm_texts(MEMBER_B).len(), 1);
        assert!(delivery.dm_texts(MEMBER_C).is_empty());
        assert!(!coordinator.registry().contains(&ParticipantId::new(MEMBER_C)));

        // The flow completes with the two reachable participants.
        drive_member_round(&mut coordinator, MEMBER_B).await;
        drive_member_round(&mut coordinator, LEADER).await;
        assert!(coordinator.registry().discussion_launched());
        assert_eq!(store.count(ReportKind::TeamMember), 2);
    }

    #[tokio::test]
    async fn test_discussion_survives_missing_broadcast_channel() {
        let delivery = Arc::new(RecordingDelivery::new().fail_broadcast());
        let store = Arc::new(MemoryReportStore::new());
        let mut coordinator = coordinator(delivery.clone(), store.clone());

        drive_leader_round(&mut coordinator).await;
        for id in [MEMBER_B, MEMBER_C, LEADER] {
            drive_member_round(&mut coordinator, id).await;
        }

        // No broadcast channel, but summaries and preparations still land.
        assert_eq!(delivery.broadcast_channel_count(), 0);
        for id in [LEADER, MEMBER_B, MEMBER_C] {
            assert!(delivery
                .dm_texts(id)
                .iter()
                .any(|t| t.starts_with("To prepare for the next meeting:")));
        }
    }

    #[tokio::test]
    async fn test_voice_message_without_transcriber_is_a_hard_error() {
        let delivery = Arc::new(RecordingDelivery::new());
        let store = Arc::new(MemoryReportStore::new());
        let mut coordinator = coordinator(delivery, store);

        let mut voice = event(LEADER, "");
        voice.files.push(FileRef::Audio(AudioRef {
            url: "https://files.example/audio.m4a".to_string(),
            file_type: "m4a".to_string(),
            content_type: Some("audio/mp4".to_string()),
        }));

        let result = coordinator.handle_event(voice).await;
        assert!(matches!(
            result,
            Err(CoordinatorError::TranscriberUnavailable)
        ));
    }

    #[tokio::test]
    async fn test_sentinel_replies_reach_the_participant() {
        // A gateway that fails on every call still walks the leader through
        // the protocol, with visible sentinel text instead of questions.
        let delivery = Arc::new(RecordingDelivery::new());
        let store = Arc::new(MemoryReportStore::new());
        let mut coordinator = Coordinator::new(
            Arc::new(ScriptedGateway::failing()),
            delivery.clone(),
            store.clone(),
        );

        coordinator.handle_event(event(LEADER, "hi")).await.unwrap();
        coordinator
            .handle_event(event(LEADER, "the situation"))
            .await
            .unwrap();

        let dms = delivery.dm_texts(LEADER);
        assert!(dms[1].starts_with("I encountered an error:"));
    }
}
