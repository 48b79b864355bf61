//! Domain error types

use crate::report::ReportKind;
use thiserror::Error;

/// Protocol and state errors.
///
/// These are fatal to the operation that raised them: the current transition
/// is aborted and the participant's stage is left untouched.
#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("Conversation already seeded; collect_initial_input may only run once")]
    AlreadySeeded,

    #[error("No dialogue bot attached to the session in stage {stage}")]
    NoBotAttached { stage: String },

    #[error("No {kind} report on file for {participant}")]
    MissingReport {
        kind: ReportKind,
        participant: String,
    },

    #[error("No leader registered; the discussion cannot be seeded")]
    NoLeader,

    #[error("Discussion requires at least one agent")]
    NoAgents,
}
