//! Report artifact keys and timestamp ordering.
//!
//! Reports are persisted externally, keyed by `(kind, participant, timestamp)`.
//! The timestamp format is fixed-width `YYYYMMDD-HHMMSS`, so lexicographic
//! comparison of timestamp strings equals chronological comparison: the
//! "latest report" lookup is a plain string max, independent of storage.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Which protocol round produced a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    /// Situation overview and recommendations from the leader's round.
    Leadership,
    /// Opinions, concerns, solutions and insights from a stakeholder's round.
    TeamMember,
}

impl ReportKind {
    /// Filename prefix for this kind of report.
    pub fn file_prefix(&self) -> &'static str {
        match self {
            ReportKind::Leadership => "leadership_report",
            ReportKind::TeamMember => "team_member_report",
        }
    }
}

impl std::fmt::Display for ReportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportKind::Leadership => write!(f, "leadership"),
            ReportKind::TeamMember => write!(f, "team_member"),
        }
    }
}

/// Identity of one persisted report artifact (Value Object).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportKey {
    pub kind: ReportKind,
    pub participant: String,
    pub timestamp: String,
}

impl ReportKey {
    pub fn new(
        kind: ReportKind,
        participant: impl Into<String>,
        timestamp: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            participant: participant.into(),
            timestamp: timestamp.into(),
        }
    }

    /// Flat filename for this key.
    ///
    /// Leadership reports are keyed only by timestamp; team-member reports
    /// also carry the participant name.
    pub fn filename(&self) -> String {
        match self.kind {
            ReportKind::Leadership => {
                format!("{}_{}.txt", self.kind.file_prefix(), self.timestamp)
            }
            ReportKind::TeamMember => format!(
                "{}_{}_{}.txt",
                self.kind.file_prefix(),
                self.participant,
                self.timestamp
            ),
        }
    }

    /// Parse a filename produced by [`ReportKey::filename`].
    ///
    /// The participant name may itself contain underscores, so the timestamp
    /// is taken from the fixed-width tail of the stem.
    pub fn parse_filename(name: &str) -> Option<Self> {
        let stem = name.strip_suffix(".txt")?;

        for kind in [ReportKind::TeamMember, ReportKind::Leadership] {
            let prefix = kind.file_prefix();
            let Some(rest) = stem.strip_prefix(prefix).and_then(|r| r.strip_prefix('_')) else {
                continue;
            };
            return match kind {
                ReportKind::Leadership => {
                    if !is_well_formed_timestamp(rest) {
                        return None;
                    }
                    Some(ReportKey::new(kind, "", rest))
                }
                ReportKind::TeamMember => {
                    let (participant, timestamp) = rest.rsplit_once('_')?;
                    if participant.is_empty() || !is_well_formed_timestamp(timestamp) {
                        return None;
                    }
                    Some(ReportKey::new(kind, participant, timestamp))
                }
            };
        }
        None
    }
}

/// Check that a timestamp is the fixed-width `YYYYMMDD-HHMMSS` form.
pub fn is_well_formed_timestamp(ts: &str) -> bool {
    let bytes = ts.as_bytes();
    if bytes.len() != 15 || bytes[8] != b'-' {
        return false;
    }
    bytes
        .iter()
        .enumerate()
        .all(|(i, b)| i == 8 || b.is_ascii_digit())
}

/// Chronological comparison of two fixed-width timestamps.
///
/// With the fixed format this is exactly lexicographic string order.
pub fn compare_timestamps(a: &str, b: &str) -> Ordering {
    a.cmp(b)
}
