//! Discussion agents, configuration surface, and emitted events.

use serde::{Deserialize, Serialize};

/// An autonomous party in the round-robin discussion (Entity).
///
/// Seeded from one participant's persisted report; the report text becomes
/// the agent's standing context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscussionAgent {
    /// Display name; also the sender tag in the shared history.
    pub name: String,
    /// One-line stance or perspective description.
    pub role: String,
    /// Standing context: the participant's report.
    pub context: String,
}

impl DiscussionAgent {
    pub fn new(
        name: impl Into<String>,
        role: impl Into<String>,
        context: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            role: role.into(),
            context: context.into(),
        }
    }
}

/// Tunable surface of the discussion engine.
///
/// The observed variants of this flow differ in turn count and final-turn
/// wording; those knobs are explicit configuration here rather than five
/// competing hard-coded behaviors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscussionConfig {
    /// Fixed number of round-robin turns.
    pub turns: usize,
    /// Nudge appended to the prompt on the final turn.
    pub final_turn_suffix: String,
}

impl Default for DiscussionConfig {
    fn default() -> Self {
        Self {
            turns: 6,
            final_turn_suffix:
                " This is the final turn: propose your concrete solution to close the discussion."
                    .to_string(),
        }
    }
}

impl DiscussionConfig {
    pub fn with_turns(mut self, turns: usize) -> Self {
        self.turns = turns;
        self
    }
}

/// Events emitted by the discussion engine, in order: exactly `turns` Turn
/// events, then one Summary per agent (same text), then one Preparation per
/// agent (individual).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DiscussionEvent {
    Turn {
        turn_index: usize,
        agent_name: String,
        response: String,
    },
    Summary {
        agent_name: String,
        summary: String,
    },
    Preparation {
        agent_name: String,
        preparation: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DiscussionConfig::default();
        assert_eq!(config.turns, 6);
        assert!(!config.final_turn_suffix.is_empty());
    }

    #[test]
    fn test_event_serialization_tags() {
        let event = DiscussionEvent::Turn {
            turn_index: 0,
            agent_name: "ana".to_string(),
            response: "hello".to_string(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"turn\""));
    }
}
