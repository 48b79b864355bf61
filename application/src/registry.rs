//! Participant registry and per-participant session state.
//!
//! One coordinator owns one registry for the life of the process. Sessions
//! are created lazily on first contact and never removed. The registry also
//! carries the one-shot discussion-launch flag: the barrier check is
//! check-then-act, so the claim is a compare-and-swap and exactly one
//! caller ever wins it.

use crate::bots::DialogueBot;
use roundtable_domain::{ChannelId, ParticipantId, Stage};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

/// Mutable state of one participant's walk through the protocol.
pub struct SessionState {
    pub participant: ParticipantId,
    pub display_name: String,
    /// DM destination for this participant.
    pub channel: ChannelId,
    pub thread_anchor: Option<String>,
    pub stage: Stage,
    /// The bot currently serving this participant, if any. Replaced when the
    /// session moves from the leadership round to the stakeholder round.
    pub bot: Option<DialogueBot>,
}

impl SessionState {
    pub fn new(participant: ParticipantId, display_name: String, channel: ChannelId) -> Self {
        Self {
            participant,
            display_name,
            channel,
            thread_anchor: None,
            stage: Stage::New,
            bot: None,
        }
    }
}

/// Registry of all known participants, keyed by platform identity.
///
/// Iteration order for discussion seating is registration order, which is
/// tracked explicitly; map iteration order is not part of any contract.
#[derive(Default)]
pub struct ParticipantRegistry {
    sessions: HashMap<ParticipantId, SessionState>,
    order: Vec<ParticipantId>,
    leader: Option<ParticipantId>,
    discussion_launched: AtomicBool,
}

impl ParticipantRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn contains(&self, id: &ParticipantId) -> bool {
        self.sessions.contains_key(id)
    }

    pub fn get(&self, id: &ParticipantId) -> Option<&SessionState> {
        self.sessions.get(id)
    }

    pub fn get_mut(&mut self, id: &ParticipantId) -> Option<&mut SessionState> {
        self.sessions.get_mut(id)
    }

    /// Insert a freshly created session. Later inserts for the same id are
    /// ignored; the first registration wins.
    pub fn insert(&mut self, state: SessionState) {
        let id = state.participant.clone();
        if self.sessions.contains_key(&id) {
            return;
        }
        self.order.push(id.clone());
        self.sessions.insert(id, state);
    }

    /// Sessions in registration order.
    pub fn iter_in_order(&self) -> impl Iterator<Item = &SessionState> {
        self.order.iter().filter_map(|id| self.sessions.get(id))
    }

    pub fn leader(&self) -> Option<&ParticipantId> {
        self.leader.as_ref()
    }

    /// Record the flow initiator. The first leader sticks.
    pub fn set_leader(&mut self, id: ParticipantId) {
        if self.leader.is_none() {
            self.leader = Some(id);
        }
    }

    /// Barrier condition: every known participant has filed a report.
    ///
    /// Evaluated on every qualifying transition, not just the triggering
    /// one; an empty registry is never ready.
    pub fn all_ready(&self) -> bool {
        !self.sessions.is_empty()
            && self
                .sessions
                .values()
                .all(|s| s.stage.is_ready_for_discussion())
    }

    /// Claim the one-time discussion launch. Returns true exactly once.
    pub fn try_claim_launch(&self) -> bool {
        self.discussion_launched
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Whether the discussion has already been claimed.
    pub fn discussion_launched(&self) -> bool {
        self.discussion_launched.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(id: &str, stage: Stage) -> SessionState {
        let mut s = SessionState::new(
            ParticipantId::new(id),
            id.to_lowercase(),
            ChannelId::new(format!("D-{}", id)),
        );
        s.stage = stage;
        s
    }

    #[test]
    fn test_registration_order_is_preserved() {
        let mut registry = ParticipantRegistry::new();
        for id in ["U3", "U1", "U2"] {
            registry.insert(session(id, Stage::New));
        }
        let order: Vec<&str> = registry
            .iter_in_order()
            .map(|s| s.participant.as_str())
            .collect();
        assert_eq!(order, vec!["U3", "U1", "U2"]);
    }

    #[test]
    fn test_duplicate_insert_keeps_first() {
        let mut registry = ParticipantRegistry::new();
        registry.insert(session("U1", Stage::AwaitingOpinion));
        registry.insert(session("U1", Stage::New));
        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.get(&ParticipantId::new("U1")).unwrap().stage,
            Stage::AwaitingOpinion
        );
    }

    #[test]
    fn test_barrier_requires_every_entry_ready() {
        let mut registry = ParticipantRegistry::new();
        assert!(!registry.all_ready());

        registry.insert(session("U1", Stage::ReadyForDiscussion));
        registry.insert(session("U2", Stage::AwaitingOpinion));
        assert!(!registry.all_ready());

        registry
            .get_mut(&ParticipantId::new("U2"))
            .unwrap()
            .stage = Stage::ReadyForDiscussion;
        assert!(registry.all_ready());
    }

    #[test]
    fn test_launch_claim_fires_exactly_once() {
        let registry = ParticipantRegistry::new();
        assert!(registry.try_claim_launch());
        assert!(!registry.try_claim_launch());
        assert!(!registry.try_claim_launch());
        assert!(registry.discussion_launched());
    }

    #[test]
    fn test_first_leader_sticks() {
        let mut registry = ParticipantRegistry::new();
        registry.set_leader(ParticipantId::new("U1"));
        registry.set_leader(ParticipantId::new("U2"));
        assert_eq!(registry.leader().unwrap().as_str(), "U1");
    }
}
