//! Document text-extraction port
//!
//! Hard-error semantics, same as transcription: a document that cannot be
//! read has no sensible fallback text.

use async_trait::async_trait;
use thiserror::Error;

/// Errors raised by the document extraction service.
#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("Failed to fetch document: {0}")]
    Fetch(String),

    #[error("Extraction request failed: {0}")]
    RequestFailed(String),

    #[error("Document produced no text")]
    Empty,
}

/// Text extraction for attached documents (PDF and friends).
#[async_trait]
pub trait DocumentExtractor: Send + Sync {
    /// Extract plain text from the document at `url`.
    async fn extract_text(&self, url: &str) -> Result<String, ExtractionError>;
}
