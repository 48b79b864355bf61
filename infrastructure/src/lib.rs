//! Infrastructure layer for roundtable
//!
//! External adapters: the OpenAI completion and transcription clients, the
//! Slack delivery client and event mapping, the flat-file report store,
//! the figment configuration loader, and the JSONL transcript logger.

pub mod config;
pub mod console;
pub mod logging;
pub mod providers;
pub mod reports;
pub mod slack;

// Re-export commonly used types
pub use config::{ConfigLoader, FileConfig};
pub use console::ConsoleDelivery;
pub use logging::JsonlTranscriptLogger;
pub use providers::{
    OpenAiCompletionGateway, OpenAiConfig, OpenAiTranscriber, RemoteDocumentExtractor,
    ScriptedCompletionGateway,
};
pub use reports::FileReportStore;
pub use slack::SlackDelivery;
