//! Mock ports shared by the use-case tests.

use crate::ports::completion::{CompletionError, CompletionGateway};
use crate::ports::delivery::{ChatDelivery, DeliveryError};
use crate::ports::report_store::{ReportStore, StoreError};
use async_trait::async_trait;
use roundtable_domain::{
    ChannelId, Message, ParticipantId, ReportKey, ReportKind, Role, compare_timestamps,
};
use std::collections::{HashSet, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

enum GatewayMode {
    /// Return the content of the last user message.
    Echo,
    /// Pop scripted replies, then fall back to numbered ones.
    Replies(Mutex<VecDeque<String>>),
    /// Fail every call.
    Fail,
}

/// Deterministic completion gateway for tests.
pub struct ScriptedGateway {
    mode: GatewayMode,
    calls: AtomicUsize,
}

impl ScriptedGateway {
    pub fn echoing() -> Self {
        Self {
            mode: GatewayMode::Echo,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            mode: GatewayMode::Fail,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_replies(replies: &[&str]) -> Self {
        Self {
            mode: GatewayMode::Replies(Mutex::new(
                replies.iter().map(|r| r.to_string()).collect(),
            )),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CompletionGateway for ScriptedGateway {
    async fn complete(&self, messages: &[Message]) -> Result<String, CompletionError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.mode {
            GatewayMode::Fail => Err(CompletionError::RequestFailed(
                "scripted failure".to_string(),
            )),
            GatewayMode::Echo => Ok(messages
                .iter()
                .rev()
                .find(|m| m.role == Role::User)
                .map(|m| m.content.clone())
                .unwrap_or_default()),
            GatewayMode::Replies(replies) => Ok(replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| format!("scripted reply {}", call))),
        }
    }
}

/// One message recorded by [`RecordingDelivery`].
#[derive(Debug, Clone)]
pub struct SentMessage {
    pub channel: ChannelId,
    pub text: String,
}

/// Delivery mock that records everything it is asked to send.
#[derive(Default)]
pub struct RecordingDelivery {
    sent: Mutex<Vec<SentMessage>>,
    broadcast_channels: Mutex<Vec<String>>,
    fail_open_for: Mutex<HashSet<String>>,
    fail_broadcast: Mutex<bool>,
}

impl RecordingDelivery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `open_direct_channel` fail for one participant.
    pub fn fail_open_for(self, id: &str) -> Self {
        self.fail_open_for.lock().unwrap().insert(id.to_string());
        self
    }

    pub fn fail_broadcast(self) -> Self {
        *self.fail_broadcast.lock().unwrap() = true;
        self
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().unwrap().clone()
    }

    /// Texts sent to one participant's DM channel.
    pub fn dm_texts(&self, id: &str) -> Vec<String> {
        let channel = ChannelId::new(format!("D-{}", id));
        self.sent()
            .into_iter()
            .filter(|m| m.channel == channel)
            .map(|m| m.text)
            .collect()
    }

    /// Texts sent to the broadcast channel, if one was created.
    pub fn broadcast_texts(&self) -> Vec<String> {
        let Some(name) = self.broadcast_channels.lock().unwrap().first().cloned() else {
            return Vec::new();
        };
        let channel = ChannelId::new(format!("#{}", name));
        self.sent()
            .into_iter()
            .filter(|m| m.channel == channel)
            .map(|m| m.text)
            .collect()
    }

    pub fn broadcast_channel_count(&self) -> usize {
        self.broadcast_channels.lock().unwrap().len()
    }
}

#[async_trait]
impl ChatDelivery for RecordingDelivery {
    async fn send(
        &self,
        channel: &ChannelId,
        text: &str,
        _thread_anchor: Option<&str>,
    ) -> Result<(), DeliveryError> {
        self.sent.lock().unwrap().push(SentMessage {
            channel: channel.clone(),
            text: text.to_string(),
        });
        Ok(())
    }

    async fn open_direct_channel(
        &self,
        participant: &ParticipantId,
    ) -> Result<ChannelId, DeliveryError> {
        if self
            .fail_open_for
            .lock()
            .unwrap()
            .contains(participant.as_str())
        {
            return Err(DeliveryError::Api {
                method: "conversations.open".to_string(),
                message: "user_not_found".to_string(),
            });
        }
        Ok(ChannelId::new(format!("D-{}", participant.as_str())))
    }

    async fn resolve_display_name(
        &self,
        participant: &ParticipantId,
    ) -> Result<String, DeliveryError> {
        Ok(participant.as_str().to_lowercase())
    }

    async fn list_direct_channels(&self) -> Result<Vec<ChannelId>, DeliveryError> {
        let mut channels: Vec<ChannelId> = self
            .sent()
            .into_iter()
            .map(|m| m.channel)
            .filter(|c| c.as_str().starts_with("D-"))
            .collect();
        channels.dedup();
        Ok(channels)
    }

    async fn create_broadcast_channel(&self, name: &str) -> Result<ChannelId, DeliveryError> {
        if *self.fail_broadcast.lock().unwrap() {
            return Err(DeliveryError::Api {
                method: "conversations.create".to_string(),
                message: "restricted_action".to_string(),
            });
        }
        self.broadcast_channels
            .lock()
            .unwrap()
            .push(name.to_string());
        Ok(ChannelId::new(format!("#{}", name)))
    }
}

/// In-memory report store for tests.
#[derive(Default)]
pub struct MemoryReportStore {
    records: Mutex<Vec<(ReportKey, String)>>,
}

impl MemoryReportStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn keys(&self) -> Vec<ReportKey> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .map(|(k, _)| k.clone())
            .collect()
    }

    pub fn latest_sync(&self, kind: ReportKind, participant: Option<&str>) -> Option<String> {
        self.records
            .lock()
            .unwrap()
            .iter()
            .filter(|(k, _)| k.kind == kind)
            .filter(|(k, _)| participant.is_none_or(|p| k.participant == p))
            .max_by(|(a, _), (b, _)| compare_timestamps(&a.timestamp, &b.timestamp))
            .map(|(_, text)| text.clone())
    }

    pub fn count(&self, kind: ReportKind) -> usize {
        self.records
            .lock()
            .unwrap()
            .iter()
            .filter(|(k, _)| k.kind == kind)
            .count()
    }
}

#[async_trait]
impl ReportStore for MemoryReportStore {
    async fn put(&self, key: &ReportKey, text: &str) -> Result<(), StoreError> {
        self.records
            .lock()
            .unwrap()
            .push((key.clone(), text.to_string()));
        Ok(())
    }

    async fn latest(
        &self,
        kind: ReportKind,
        participant: Option<&str>,
    ) -> Result<Option<String>, StoreError> {
        Ok(self.latest_sync(kind, participant))
    }
}
