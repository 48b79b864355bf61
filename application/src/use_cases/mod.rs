//! Use cases orchestrating the decision-discussion flow.

pub mod handle_event;
pub mod run_discussion;
