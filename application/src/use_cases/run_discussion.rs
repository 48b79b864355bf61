//! Multi-agent round-robin discussion engine.
//!
//! Given one agent per participant (seeded with that participant's report)
//! and a starting prompt, runs a fixed number of round-robin turns over a
//! single shared history, then produces one shared summary and one
//! preparation note per agent.
//!
//! Events stream through an mpsc channel so the caller can act on each turn
//! before the next begins. The engine is monotonic: a completion failure
//! inside a turn becomes that turn's sentinel response and the run carries
//! on, so a run always emits exactly `turns` Turn events, then N Summary
//! events, then N Preparation events.

use crate::ports::completion::{CompletionGateway, sentinel_reply};
use roundtable_domain::{
    DiscussionAgent, DiscussionConfig, DiscussionEvent, DiscussionPrompts, Message, ProtocolError,
    SharedHistoryEntry, speaker_for_turn, view,
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// The round-robin discussion engine.
pub struct DiscussionEngine {
    gateway: Arc<dyn CompletionGateway>,
    agents: Vec<DiscussionAgent>,
    config: DiscussionConfig,
}

impl DiscussionEngine {
    pub fn new(
        gateway: Arc<dyn CompletionGateway>,
        agents: Vec<DiscussionAgent>,
        config: DiscussionConfig,
    ) -> Result<Self, ProtocolError> {
        if agents.is_empty() {
            return Err(ProtocolError::NoAgents);
        }
        Ok(Self {
            gateway,
            agents,
            config,
        })
    }

    /// Spawn the run on its own task, returning the event stream.
    ///
    /// Channel capacity 1 keeps the handoff tight: the next turn is not
    /// generated until the caller has taken the previous event.
    pub fn spawn(self, initial_prompt: String) -> mpsc::Receiver<DiscussionEvent> {
        let (tx, rx) = mpsc::channel(1);
        tokio::spawn(async move {
            self.run(initial_prompt, tx).await;
        });
        rx
    }

    /// Run the full discussion, emitting events into `events`.
    ///
    /// A dropped receiver stops the run early; nothing else does.
    pub async fn run(self, initial_prompt: String, events: mpsc::Sender<DiscussionEvent>) {
        info!(
            agents = self.agents.len(),
            turns = self.config.turns,
            "starting simulated discussion"
        );

        let mut history: Vec<SharedHistoryEntry> = Vec::new();
        let mut current_message = initial_prompt;

        for turn in 0..self.config.turns {
            let speaker = &self.agents[speaker_for_turn(turn, self.agents.len())];

            let mut turn_input = current_message.clone();
            if turn + 1 == self.config.turns {
                turn_input.push_str(&self.config.final_turn_suffix);
            }

            let reply = self
                .agent_completion(speaker, &history, &DiscussionPrompts::turn_prompt(&turn_input))
                .await;
            debug!(turn, speaker = %speaker.name, "turn complete");

            let event = DiscussionEvent::Turn {
                turn_index: turn,
                agent_name: speaker.name.clone(),
                response: reply.clone(),
            };
            if events.send(event).await.is_err() {
                return;
            }

            // One shared log; every agent's replay is a projection of it.
            history.push(SharedHistoryEntry::new(&speaker.name, &reply));
            current_message = reply;
        }

        // One summary call using the first agent's view, broadcast to all.
        let summary = self
            .agent_completion(&self.agents[0], &history, DiscussionPrompts::summary_prompt())
            .await;
        for agent in &self.agents {
            let event = DiscussionEvent::Summary {
                agent_name: agent.name.clone(),
                summary: summary.clone(),
            };
            if events.send(event).await.is_err() {
                return;
            }
        }

        // One preparation call per agent over its own view.
        for agent in &self.agents {
            let preparation = self
                .agent_completion(agent, &history, DiscussionPrompts::preparation_prompt())
                .await;
            let event = DiscussionEvent::Preparation {
                agent_name: agent.name.clone(),
                preparation,
            };
            if events.send(event).await.is_err() {
                return;
            }
        }

        info!("simulated discussion finished");
    }

    /// One completion call as `agent`: persona system message, the agent's
    /// view of the shared history, then `request` as the closing user
    /// message. Failure degrades to the sentinel text.
    async fn agent_completion(
        &self,
        agent: &DiscussionAgent,
        history: &[SharedHistoryEntry],
        request: &str,
    ) -> String {
        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(Message::system(DiscussionPrompts::agent_system(
            &agent.name,
            &agent.role,
            &agent.context,
        )));
        messages.extend(view(history, &agent.name));
        messages.push(Message::user(request));

        match self.gateway.complete(&messages).await {
            Ok(reply) => reply,
            Err(err) => {
                warn!(agent = %agent.name, error = %err, "discussion turn degraded to sentinel");
                sentinel_reply(&err)
            }
        }
    }
}
