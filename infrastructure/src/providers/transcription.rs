//! OpenAI Whisper transcription adapter.
//!
//! Downloads the audio from the chat platform (the file URLs require the
//! bot token) and submits it to the transcription endpoint as multipart
//! form data.

use async_trait::async_trait;
use roundtable_application::ports::transcription::{
    AudioRef, SpeechTranscriber, TranscriptionError,
};
use std::time::Duration;
use tracing::debug;

const TRANSCRIPTION_MODEL: &str = "whisper-1";

/// Speech-to-text adapter backed by the OpenAI audio API.
pub struct OpenAiTranscriber {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
    /// Bearer token for downloading platform-hosted files, when required.
    download_token: Option<String>,
}

impl OpenAiTranscriber {
    pub fn new(api_key: impl Into<String>) -> Result<Self, TranscriptionError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| TranscriptionError::RequestFailed(e.to_string()))?;
        Ok(Self {
            http,
            api_key: api_key.into(),
            base_url: "https://api.openai.com".to_string(),
            download_token: None,
        })
    }

    pub fn with_download_token(mut self, token: impl Into<String>) -> Self {
        self.download_token = Some(token.into());
        self
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>, TranscriptionError> {
        let mut request = self.http.get(url);
        if let Some(token) = &self.download_token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }
        let response = request
            .send()
            .await
            .map_err(|e| TranscriptionError::Download(e.to_string()))?;
        if !response.status().is_success() {
            return Err(TranscriptionError::Download(format!(
                "status {}",
                response.status()
            )));
        }
        let bytes = response
            .bytes()
            .await
            .map_err(|e| TranscriptionError::Download(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl SpeechTranscriber for OpenAiTranscriber {
    async fn transcribe(
        &self,
        audio: &AudioRef,
        language: &str,
    ) -> Result<String, TranscriptionError> {
        if audio.file_type.is_empty() {
            return Err(TranscriptionError::UnsupportedFormat(
                "missing file extension".to_string(),
            ));
        }

        let bytes = self.download(&audio.url).await?;
        debug!(bytes = bytes.len(), file_type = %audio.file_type, "submitting audio");

        let mime = audio
            .content_type
            .clone()
            .unwrap_or_else(|| "audio/mp4".to_string());
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(format!("audio.{}", audio.file_type))
            .mime_str(&mime)
            .map_err(|e| TranscriptionError::UnsupportedFormat(e.to_string()))?;

        let form = reqwest::multipart::Form::new()
            .text("model", TRANSCRIPTION_MODEL)
            .text("response_format", "text")
            .text("language", language.to_string())
            .part("file", part);

        let response = self
            .http
            .post(format!(
                "{}/v1/audio/transcriptions",
                self.base_url.trim_end_matches('/')
            ))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .multipart(form)
            .send()
            .await
            .map_err(|e| TranscriptionError::RequestFailed(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| TranscriptionError::RequestFailed(e.to_string()))?;
        if !status.is_success() {
            return Err(TranscriptionError::RequestFailed(format!(
                "{}: {}",
                status, text
            )));
        }
        Ok(text.trim().to_string())
    }
}
