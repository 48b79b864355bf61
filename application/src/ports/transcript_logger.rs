//! Port for structured transcript logging.
//!
//! Separate from `tracing`-based operation logs: tracing carries
//! human-readable diagnostics, while this port records the flow itself:
//! stage transitions, degraded completions, discussion turns, in a
//! machine-readable form (one record per event).

use serde_json::Value;

/// A structured transcript event.
pub struct TranscriptEvent {
    /// Event type identifier (e.g. "stage_transition", "completion_degraded").
    pub event_type: &'static str,
    /// JSON payload with event-specific data.
    pub payload: Value,
}

impl TranscriptEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Port for recording transcript events.
///
/// Intentionally synchronous and non-fallible: a logging failure must never
/// disturb the conversation flow, so implementations swallow their own
/// errors.
pub trait TranscriptLogger: Send + Sync {
    fn log(&self, event: TranscriptEvent);
}

/// No-op implementation for tests and when logging is disabled.
pub struct NoTranscriptLogger;

impl TranscriptLogger for NoTranscriptLogger {
    fn log(&self, _event: TranscriptEvent) {}
}
