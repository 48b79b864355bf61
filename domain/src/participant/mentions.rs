//! Recipient extraction from free-form mention text.
//!
//! Recipients are written inline as `<@U03AB12CD>` in the chat platform's
//! mention syntax. These functions are pure text parsing: no I/O, no
//! session state.

use super::ParticipantId;

/// Extract the participants mentioned in `text`, in first-occurrence order.
///
/// Malformed fragments (`<@` without a closing `>`, empty ids) are skipped.
/// Duplicates are collapsed to the first occurrence.
pub fn parse_mentions(text: &str) -> Vec<ParticipantId> {
    let mut found = Vec::new();
    let mut rest = text;

    while let Some(start) = rest.find("<@") {
        rest = &rest[start + 2..];
        let Some(end) = rest.find('>') else {
            break;
        };
        let id = &rest[..end];
        rest = &rest[end + 1..];

        if id.is_empty() || id.chars().any(char::is_whitespace) {
            continue;
        }
        let id = ParticipantId::new(id);
        if !found.contains(&id) {
            found.push(id);
        }
    }

    found
}

/// Build the recipient list for a report fan-out.
///
/// Mentions are deduplicated against the sender, and the sender is always
/// appended last so the result is never empty; the leader takes part in
/// the stakeholder round alongside everyone they mentioned.
pub fn extract_recipients(text: &str, sender: &ParticipantId) -> Vec<ParticipantId> {
    let mut recipients: Vec<ParticipantId> = parse_mentions(text)
        .into_iter()
        .filter(|id| id != sender)
        .collect();
    recipients.push(sender.clone());
    recipients
}
