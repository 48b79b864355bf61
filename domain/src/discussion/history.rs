//! Shared discussion history and the per-viewer role flip.

use crate::conversation::Message;
use serde::{Deserialize, Serialize};

/// One spoken turn as recorded in the shared discussion log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SharedHistoryEntry {
    pub sender: String,
    pub content: String,
}

impl SharedHistoryEntry {
    pub fn new(sender: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            content: content.into(),
        }
    }
}

/// Project the shared history into one viewer's replay.
///
/// A message is tagged Assistant when the viewer spoke it and User
/// otherwise, so each agent sees its own past turns as its own words.
/// Computed on demand; there is exactly one shared log, never one copy
/// per agent.
pub fn view(history: &[SharedHistoryEntry], viewer_name: &str) -> Vec<Message> {
    history
        .iter()
        .map(|entry| {
            if entry.sender == viewer_name {
                Message::assistant(entry.content.clone())
            } else {
                Message::user(entry.content.clone())
            }
        })
        .collect()
}
