//! Mapping of Slack event-callback payloads onto [`InboundEvent`].
//!
//! Webhook transport (signatures, retries, the HTTP endpoint itself) is out
//! of scope; this module only understands the payload shapes the flow
//! consumes: `app_mention`, DM `message` events, and their file
//! attachments.

use roundtable_application::events::{FileRef, InboundEvent};
use roundtable_application::ports::transcription::AudioRef;
use roundtable_domain::ParticipantId;
use serde::Deserialize;

/// Top-level event callback envelope.
#[derive(Debug, Deserialize)]
pub struct EventCallback {
    #[serde(rename = "type")]
    pub kind: String,
    /// Present only on `url_verification` handshakes.
    pub challenge: Option<String>,
    pub event: Option<MessageEvent>,
}

/// The inner message event.
#[derive(Debug, Deserialize)]
pub struct MessageEvent {
    #[serde(rename = "type")]
    pub kind: String,
    pub user: Option<String>,
    #[serde(default)]
    pub text: String,
    pub ts: Option<String>,
    pub thread_ts: Option<String>,
    /// Set on bot echoes; those must not re-enter the flow.
    pub bot_id: Option<String>,
    #[serde(default)]
    pub files: Vec<FileAttachment>,
}

/// One attached file as Slack describes it.
#[derive(Debug, Deserialize)]
pub struct FileAttachment {
    pub url_private: Option<String>,
    #[serde(default)]
    pub filetype: String,
    pub mimetype: Option<String>,
}

impl EventCallback {
    /// The verification challenge to echo back, when this is a handshake.
    pub fn verification_challenge(&self) -> Option<&str> {
        (self.kind == "url_verification")
            .then_some(self.challenge.as_deref())
            .flatten()
    }
}

/// Convert a message event into the inbound shape the coordinator consumes.
///
/// Returns `None` for events that must not drive the flow: bot echoes and
/// events with no user attached.
pub fn to_inbound_event(event: &MessageEvent) -> Option<InboundEvent> {
    if event.bot_id.is_some() {
        return None;
    }
    let user = event.user.as_deref()?;

    let files = event
        .files
        .iter()
        .filter_map(|file| {
            let url = file.url_private.clone()?;
            let mimetype = file.mimetype.as_deref().unwrap_or_default();
            if mimetype.starts_with("audio/") || mimetype == "video/mp4" {
                Some(FileRef::Audio(AudioRef {
                    url,
                    file_type: file.filetype.clone(),
                    content_type: file.mimetype.clone(),
                }))
            } else if mimetype == "application/pdf" {
                Some(FileRef::Document { url })
            } else {
                None
            }
        })
        .collect();

    Some(InboundEvent {
        participant: ParticipantId::new(user),
        text: event.text.clone(),
        files,
        thread_anchor: event.thread_ts.clone().or_else(|| event.ts.clone()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_verification_challenge() {
        let callback: EventCallback = serde_json::from_str(
            r#"{ "type": "url_verification", "challenge": "abc123" }"#,
        )
        .unwrap();
        assert_eq!(callback.verification_challenge(), Some("abc123"));
    }

    #[test]
    fn test_dm_message_maps_to_inbound_event() {
        let callback: EventCallback = serde_json::from_str(
            r#"{
                "type": "event_callback",
                "event": {
                    "type": "message",
                    "user": "U111",
                    "text": "my opinion",
                    "ts": "1712.0001"
                }
            }"#,
        )
        .unwrap();
        let event = to_inbound_event(callback.event.as_ref().unwrap()).unwrap();
        assert_eq!(event.participant.as_str(), "U111");
        assert_eq!(event.text, "my opinion");
        assert_eq!(event.thread_anchor.as_deref(), Some("1712.0001"));
    }

    #[test]
    fn test_bot_echoes_are_dropped() {
        let event = MessageEvent {
            kind: "message".to_string(),
            user: Some("U111".to_string()),
            text: "echo".to_string(),
            ts: None,
            thread_ts: None,
            bot_id: Some("B01".to_string()),
            files: Vec::new(),
        };
        assert!(to_inbound_event(&event).is_none());
    }

    #[test]
    fn test_audio_and_pdf_attachments_are_classified() {
        let callback: EventCallback = serde_json::from_str(
            r#"{
                "type": "event_callback",
                "event": {
                    "type": "message",
                    "user": "U111",
                    "text": "",
                    "files": [
                        { "url_private": "https://f/1", "filetype": "m4a", "mimetype": "audio/mp4" },
                        { "url_private": "https://f/2", "filetype": "pdf", "mimetype": "application/pdf" },
                        { "url_private": "https://f/3", "filetype": "png", "mimetype": "image/png" }
                    ]
                }
            }"#,
        )
        .unwrap();
        let event = to_inbound_event(callback.event.as_ref().unwrap()).unwrap();
        assert_eq!(event.files.len(), 2);
        assert!(matches!(event.files[0], FileRef::Audio(_)));
        assert!(matches!(event.files[1], FileRef::Document { .. }));
    }
}
