//! Slack Web API delivery adapter and inbound event mapping.

pub mod events;

use async_trait::async_trait;
use roundtable_application::ports::delivery::{ChatDelivery, DeliveryError};
use roundtable_domain::{ChannelId, ParticipantId};
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

const SLACK_API: &str = "https://slack.com/api";

/// Delivery adapter over the Slack Web API.
pub struct SlackDelivery {
    http: reqwest::Client,
    bot_token: String,
    base_url: String,
}

impl SlackDelivery {
    pub fn new(bot_token: impl Into<String>) -> Result<Self, DeliveryError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| DeliveryError::Transport(e.to_string()))?;
        Ok(Self {
            http,
            bot_token: bot_token.into(),
            base_url: SLACK_API.to_string(),
        })
    }

    /// Call one Web API method and unwrap Slack's `{ok, error}` envelope.
    async fn call(&self, method: &str, body: Value) -> Result<Value, DeliveryError> {
        debug!(method, "slack api call");
        let response = self
            .http
            .post(format!("{}/{}", self.base_url, method))
            .header("Authorization", format!("Bearer {}", self.bot_token))
            .json(&body)
            .send()
            .await
            .map_err(|e| DeliveryError::Transport(e.to_string()))?;

        let payload: Value = response
            .json()
            .await
            .map_err(|e| DeliveryError::Transport(e.to_string()))?;

        if payload["ok"].as_bool() != Some(true) {
            return Err(DeliveryError::Api {
                method: method.to_string(),
                message: payload["error"]
                    .as_str()
                    .unwrap_or("unknown_error")
                    .to_string(),
            });
        }
        Ok(payload)
    }
}

#[async_trait]
impl ChatDelivery for SlackDelivery {
    async fn send(
        &self,
        channel: &ChannelId,
        text: &str,
        thread_anchor: Option<&str>,
    ) -> Result<(), DeliveryError> {
        let mut body = serde_json::json!({
            "channel": channel.as_str(),
            "text": text,
        });
        if let Some(anchor) = thread_anchor {
            body["thread_ts"] = Value::String(anchor.to_string());
        }
        self.call("chat.postMessage", body).await?;
        Ok(())
    }

    async fn open_direct_channel(
        &self,
        participant: &ParticipantId,
    ) -> Result<ChannelId, DeliveryError> {
        let payload = self
            .call(
                "conversations.open",
                serde_json::json!({ "users": participant.as_str() }),
            )
            .await?;
        payload["channel"]["id"]
            .as_str()
            .map(ChannelId::new)
            .ok_or_else(|| DeliveryError::Api {
                method: "conversations.open".to_string(),
                message: "missing channel id".to_string(),
            })
    }

    async fn resolve_display_name(
        &self,
        participant: &ParticipantId,
    ) -> Result<String, DeliveryError> {
        let payload = self
            .call(
                "users.info",
                serde_json::json!({ "user": participant.as_str() }),
            )
            .await?;
        let profile = &payload["user"]["profile"];
        let name = profile["display_name"]
            .as_str()
            .filter(|n| !n.is_empty())
            .or_else(|| profile["real_name"].as_str().filter(|n| !n.is_empty()))
            .or_else(|| payload["user"]["name"].as_str());
        name.map(str::to_string)
            .ok_or_else(|| DeliveryError::UnknownParticipant(participant.to_string()))
    }

    async fn list_direct_channels(&self) -> Result<Vec<ChannelId>, DeliveryError> {
        let payload = self
            .call(
                "conversations.list",
                serde_json::json!({ "types": "im", "limit": 200 }),
            )
            .await?;
        let channels = payload["channels"]
            .as_array()
            .map(|list| {
                list.iter()
                    .filter_map(|c| c["id"].as_str().map(ChannelId::new))
                    .collect()
            })
            .unwrap_or_default();
        Ok(channels)
    }

    async fn create_broadcast_channel(&self, name: &str) -> Result<ChannelId, DeliveryError> {
        let payload = self
            .call(
                "conversations.create",
                serde_json::json!({ "name": name }),
            )
            .await?;
        payload["channel"]["id"]
            .as_str()
            .map(ChannelId::new)
            .ok_or_else(|| DeliveryError::Api {
                method: "conversations.create".to_string(),
                message: "missing channel id".to_string(),
            })
    }
}
