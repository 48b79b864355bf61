//! Offline completion gateway with canned replies.
//!
//! Used by the CLI simulation mode so the whole flow can be exercised
//! without an API key. Replies are deterministic and numbered.

use async_trait::async_trait;
use roundtable_application::ports::completion::{CompletionError, CompletionGateway};
use roundtable_domain::Message;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Deterministic stand-in for the completion service.
#[derive(Default)]
pub struct ScriptedCompletionGateway {
    calls: AtomicUsize,
}

impl ScriptedCompletionGateway {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CompletionGateway for ScriptedCompletionGateway {
    async fn complete(&self, messages: &[Message]) -> Result<String, CompletionError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        let last = messages
            .last()
            .map(|m| m.content.as_str())
            .unwrap_or_default();
        let preview: String = last.chars().take(48).collect();
        Ok(format!("[scripted reply {} to: {}]", call, preview))
    }
}
