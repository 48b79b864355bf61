//! Speech-to-text port
//!
//! Unlike completions there is no meaningful text proxy for a failed
//! transcription, so errors propagate to the caller instead of degrading
//! into sentinel text.

use async_trait::async_trait;
use thiserror::Error;

/// Reference to an attached audio file on the chat platform.
#[derive(Debug, Clone)]
pub struct AudioRef {
    /// Download URL for the audio bytes.
    pub url: String,
    /// File extension, e.g. `m4a`.
    pub file_type: String,
    /// MIME type when the platform provides one.
    pub content_type: Option<String>,
}

/// Errors raised by the transcription service.
#[derive(Error, Debug)]
pub enum TranscriptionError {
    #[error("Failed to download audio: {0}")]
    Download(String),

    #[error("Transcription request failed: {0}")]
    RequestFailed(String),

    #[error("Unsupported audio format: {0}")]
    UnsupportedFormat(String),
}

/// Speech-to-text service.
#[async_trait]
pub trait SpeechTranscriber: Send + Sync {
    /// Transcribe the referenced audio into text in `language`.
    async fn transcribe(
        &self,
        audio: &AudioRef,
        language: &str,
    ) -> Result<String, TranscriptionError>;
}
