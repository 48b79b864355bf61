//! Completion service port
//!
//! Defines the interface to the black-box text-completion service and the
//! sentinel degradation applied at the bot boundary.

use async_trait::async_trait;
use roundtable_domain::Message;
use thiserror::Error;

/// Errors that can occur when calling the completion service.
#[derive(Error, Debug)]
pub enum CompletionError {
    #[error("Connection error: {0}")]
    ConnectionFailed(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Timeout")]
    Timeout,

    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

/// Gateway to the completion service.
///
/// Given an ordered sequence of role-tagged messages, returns one generated
/// reply. Replay order must be preserved exactly by implementations.
#[async_trait]
pub trait CompletionGateway: Send + Sync {
    async fn complete(&self, messages: &[Message]) -> Result<String, CompletionError>;
}

/// Literal error text substituted for a completion reply on failure.
///
/// Participants see this as if it were an ordinary reply; the degraded mode
/// is acceptable, but callers must also log it so it stays diagnosable.
pub fn sentinel_reply(err: &CompletionError) -> String {
    format!("I encountered an error: {}", err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sentinel_reply_names_the_failure() {
        let text = sentinel_reply(&CompletionError::Timeout);
        assert_eq!(text, "I encountered an error: Timeout");
    }
}
