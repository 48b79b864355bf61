//! Remote document text-extraction adapter.
//!
//! Thin client for a hosted parse service (LlamaParse-style): the document
//! URL is submitted and plain text comes back. The platform file URL is
//! passed through so the service can fetch it directly.

use async_trait::async_trait;
use roundtable_application::ports::extraction::{DocumentExtractor, ExtractionError};
use serde::Deserialize;
use std::time::Duration;

/// Document extractor backed by a remote parsing endpoint.
pub struct RemoteDocumentExtractor {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

#[derive(Deserialize)]
struct ExtractionResponse {
    text: String,
}

impl RemoteDocumentExtractor {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Result<Self, ExtractionError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .map_err(|e| ExtractionError::RequestFailed(e.to_string()))?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
        })
    }
}

#[async_trait]
impl DocumentExtractor for RemoteDocumentExtractor {
    async fn extract_text(&self, url: &str) -> Result<String, ExtractionError> {
        let response = self
            .http
            .post(&self.endpoint)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&serde_json::json!({ "url": url, "result_type": "text" }))
            .send()
            .await
            .map_err(|e| ExtractionError::Fetch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(ExtractionError::RequestFailed(format!(
                "{}: {}",
                status, detail
            )));
        }

        let parsed: ExtractionResponse = response
            .json()
            .await
            .map_err(|e| ExtractionError::RequestFailed(e.to_string()))?;
        if parsed.text.trim().is_empty() {
            return Err(ExtractionError::Empty);
        }
        Ok(parsed.text)
    }
}
