//! Application layer for roundtable
//!
//! This crate contains the use cases driving the decision-discussion flow,
//! the port definitions for external collaborators, and the participant
//! registry. It depends only on the domain layer.

pub mod bots;
pub mod events;
pub mod ports;
pub mod registry;
pub mod use_cases;
pub mod util;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export commonly used types
pub use bots::DialogueBot;
pub use events::{FileRef, InboundEvent};
pub use ports::{
    completion::{CompletionError, CompletionGateway, sentinel_reply},
    delivery::{ChatDelivery, DeliveryError},
    extraction::{DocumentExtractor, ExtractionError},
    report_store::{ReportStore, StoreError},
    transcript_logger::{NoTranscriptLogger, TranscriptEvent, TranscriptLogger},
    transcription::{AudioRef, SpeechTranscriber, TranscriptionError},
};
pub use registry::{ParticipantRegistry, SessionState};
pub use use_cases::handle_event::{Coordinator, CoordinatorError};
pub use use_cases::run_discussion::DiscussionEngine;
