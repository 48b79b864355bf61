//! Delivery layer port
//!
//! Routes generated text to humans over the chat platform. The core calls
//! these as side-effecting actions and never interprets return values beyond
//! the channel handle.

use async_trait::async_trait;
use roundtable_domain::{ChannelId, ParticipantId};
use thiserror::Error;

/// Errors that can occur while delivering messages or resolving channels.
#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Platform rejected {method}: {message}")]
    Api { method: String, message: String },

    #[error("Unknown participant: {0}")]
    UnknownParticipant(String),
}

/// Outbound side of the chat platform.
#[async_trait]
pub trait ChatDelivery: Send + Sync {
    /// Post `text` to a channel, optionally inside a thread.
    async fn send(
        &self,
        channel: &ChannelId,
        text: &str,
        thread_anchor: Option<&str>,
    ) -> Result<(), DeliveryError>;

    /// Open (or look up) the direct-message channel for a participant.
    async fn open_direct_channel(
        &self,
        participant: &ParticipantId,
    ) -> Result<ChannelId, DeliveryError>;

    /// Resolve a participant's human-readable display name.
    async fn resolve_display_name(
        &self,
        participant: &ParticipantId,
    ) -> Result<String, DeliveryError>;

    /// List the direct-message channels the bot already has open.
    async fn list_direct_channels(&self) -> Result<Vec<ChannelId>, DeliveryError>;

    /// Create a channel for broadcasting the simulated discussion.
    async fn create_broadcast_channel(&self, name: &str) -> Result<ChannelId, DeliveryError>;
}
