//! Conversation primitives shared by dialogue bots and discussion agents.

mod entities;

pub use entities::{ConversationThread, Message, Role};
