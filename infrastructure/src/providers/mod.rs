//! Completion, transcription and extraction service adapters.

mod extraction;
mod openai;
mod scripted;
mod transcription;

pub use extraction::RemoteDocumentExtractor;
pub use openai::{OpenAiCompletionGateway, OpenAiConfig};
pub use scripted::ScriptedCompletionGateway;
pub use transcription::OpenAiTranscriber;
