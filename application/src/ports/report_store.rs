//! Report artifact store port
//!
//! Flat keyed records of `(kind, participant, timestamp)`; "latest" is the
//! maximum timestamp, which with the fixed-width format is a plain string
//! max (see `roundtable_domain::report`).

use async_trait::async_trait;
use roundtable_domain::{ReportKey, ReportKind};
use thiserror::Error;

/// Errors raised by the report store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("Corrupt record {0}")]
    Corrupt(String),
}

/// Keyed store for report artifacts.
#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Persist one report under its key.
    async fn put(&self, key: &ReportKey, text: &str) -> Result<(), StoreError>;

    /// Fetch the most recent report of `kind`.
    ///
    /// Leadership reports are a single shared series, so `participant` is
    /// only meaningful for `ReportKind::TeamMember`.
    async fn latest(
        &self,
        kind: ReportKind,
        participant: Option<&str>,
    ) -> Result<Option<String>, StoreError>;
}
