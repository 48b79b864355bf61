//! Inbound event shape consumed by the conversation stepper.

use crate::ports::transcription::AudioRef;
use roundtable_domain::ParticipantId;

/// Reference to a file attached to an inbound message.
#[derive(Debug, Clone)]
pub enum FileRef {
    /// Voice message to be transcribed before stepping.
    Audio(AudioRef),
    /// Document whose text is appended to the message.
    Document { url: String },
}

/// One inbound message from a participant.
///
/// Exactly one event is processed to completion at a time; the stepper owns
/// all mutation of session state while handling it.
#[derive(Debug, Clone)]
pub struct InboundEvent {
    pub participant: ParticipantId,
    pub text: String,
    pub files: Vec<FileRef>,
    pub thread_anchor: Option<String>,
}

impl InboundEvent {
    pub fn text_only(participant: ParticipantId, text: impl Into<String>) -> Self {
        Self {
            participant,
            text: text.into(),
            files: Vec::new(),
            thread_anchor: None,
        }
    }
}
