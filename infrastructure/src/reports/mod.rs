//! Flat-file report store.
//!
//! One file per report in a single directory, named by the domain's
//! filename encoding. "Latest" scans the directory and takes the maximum
//! timestamp; the comparison itself lives in the domain and is pure.

use async_trait::async_trait;
use glob::glob;
use roundtable_application::ports::report_store::{ReportStore, StoreError};
use roundtable_domain::{ReportKey, ReportKind, compare_timestamps};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Report store writing one text file per artifact.
pub struct FileReportStore {
    dir: PathBuf,
}

impl FileReportStore {
    /// Create a store rooted at `dir`, creating the directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|e| StoreError::Io(e.to_string()))?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// All parseable report keys of one kind, optionally filtered by
    /// participant. Files that don't parse as report keys are ignored.
    fn scan(&self, kind: ReportKind, participant: Option<&str>) -> Result<Vec<ReportKey>, StoreError> {
        let pattern = self
            .dir
            .join(format!("{}_*.txt", kind.file_prefix()))
            .to_string_lossy()
            .into_owned();
        let entries = glob(&pattern).map_err(|e| StoreError::Io(e.to_string()))?;

        let mut keys = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| StoreError::Io(e.to_string()))?;
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let Some(key) = ReportKey::parse_filename(name) else {
                continue;
            };
            if key.kind != kind {
                continue;
            }
            if let Some(p) = participant
                && key.participant != p
            {
                continue;
            }
            keys.push(key);
        }
        Ok(keys)
    }
}

#[async_trait]
impl ReportStore for FileReportStore {
    async fn put(&self, key: &ReportKey, text: &str) -> Result<(), StoreError> {
        let path = self.dir.join(key.filename());
        debug!(path = %path.display(), "persisting report");
        tokio::fs::write(&path, text)
            .await
            .map_err(|e| StoreError::Io(e.to_string()))
    }

    async fn latest(
        &self,
        kind: ReportKind,
        participant: Option<&str>,
    ) -> Result<Option<String>, StoreError> {
        let keys = self.scan(kind, participant)?;
        let Some(latest) = keys
            .into_iter()
            .max_by(|a, b| compare_timestamps(&a.timestamp, &b.timestamp))
        else {
            return Ok(None);
        };

        let path = self.dir.join(latest.filename());
        let text = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| StoreError::Io(e.to_string()))?;
        Ok(Some(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(kind: ReportKind, participant: &str, ts: &str) -> ReportKey {
        ReportKey::new(kind, participant, ts)
    }

    #[tokio::test]
    async fn test_put_then_latest_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileReportStore::new(dir.path()).unwrap();

        store
            .put(&key(ReportKind::Leadership, "lee", "20250114-090000"), "v1")
            .await
            .unwrap();
        store
            .put(&key(ReportKind::Leadership, "lee", "20250114-100000"), "v2")
            .await
            .unwrap();

        let latest = store.latest(ReportKind::Leadership, None).await.unwrap();
        assert_eq!(latest.as_deref(), Some("v2"));
    }

    #[tokio::test]
    async fn test_latest_filters_by_participant() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileReportStore::new(dir.path()).unwrap();

        store
            .put(&key(ReportKind::TeamMember, "ana", "20250114-090000"), "ana's view")
            .await
            .unwrap();
        store
            .put(&key(ReportKind::TeamMember, "ben", "20250114-100000"), "ben's view")
            .await
            .unwrap();

        let ana = store
            .latest(ReportKind::TeamMember, Some("ana"))
            .await
            .unwrap();
        assert_eq!(ana.as_deref(), Some("ana's view"));

        let missing = store
            .latest(ReportKind::TeamMember, Some("cal"))
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_foreign_files_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileReportStore::new(dir.path()).unwrap();
        std::fs::write(dir.path().join("leadership_report_not-a-ts.txt"), "junk").unwrap();

        let latest = store.latest(ReportKind::Leadership, None).await.unwrap();
        assert!(latest.is_none());
    }

    #[tokio::test]
    async fn test_empty_store_has_no_latest() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileReportStore::new(dir.path()).unwrap();
        assert!(store
            .latest(ReportKind::TeamMember, Some("ana"))
            .await
            .unwrap()
            .is_none());
    }
}
