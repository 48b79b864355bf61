//! Stdout delivery adapter for the CLI simulation mode.

use async_trait::async_trait;
use roundtable_application::ports::delivery::{ChatDelivery, DeliveryError};
use roundtable_domain::{ChannelId, ParticipantId};
use std::sync::Mutex;

/// Prints every outbound message instead of delivering it.
///
/// Channel handles are synthesized (`dm:<id>`, `#<name>`) so the flow is
/// observable end to end without a chat platform.
#[derive(Default)]
pub struct ConsoleDelivery {
    opened: Mutex<Vec<ChannelId>>,
}

impl ConsoleDelivery {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ChatDelivery for ConsoleDelivery {
    async fn send(
        &self,
        channel: &ChannelId,
        text: &str,
        _thread_anchor: Option<&str>,
    ) -> Result<(), DeliveryError> {
        println!("[{}] {}", channel, text);
        println!();
        Ok(())
    }

    async fn open_direct_channel(
        &self,
        participant: &ParticipantId,
    ) -> Result<ChannelId, DeliveryError> {
        let channel = ChannelId::new(format!("dm:{}", participant.as_str()));
        self.opened.lock().unwrap().push(channel.clone());
        Ok(channel)
    }

    async fn resolve_display_name(
        &self,
        participant: &ParticipantId,
    ) -> Result<String, DeliveryError> {
        Ok(participant.as_str().to_string())
    }

    async fn list_direct_channels(&self) -> Result<Vec<ChannelId>, DeliveryError> {
        Ok(self.opened.lock().unwrap().clone())
    }

    async fn create_broadcast_channel(&self, name: &str) -> Result<ChannelId, DeliveryError> {
        Ok(ChannelId::new(format!("#{}", name)))
    }
}
