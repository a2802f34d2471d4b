//! Prompt construction with a bounded context window.

use crate::Message;

/// Number of most recent history entries included as context.
pub const CONTEXT_WINDOW: usize = 10;

/// Build the outbound prompt for `utterance`.
///
/// With an empty history the utterance is sent verbatim. Otherwise the
/// last [`CONTEXT_WINDOW`] messages, oldest first, are rendered as
/// `Role: content` lines above the new user turn.
pub fn build_prompt(utterance: &str, history: &[Message]) -> String {
    if history.is_empty() {
        return utterance.to_string();
    }

    let start = history.len().saturating_sub(CONTEXT_WINDOW);
    let context = history[start..]
        .iter()
        .map(|msg| format!("{}: {}", msg.role().label(), msg.content()))
        .collect::<Vec<_>>()
        .join("\n");

    format!("Previous conversation:\n{context}\n\nUser: {utterance}")
}
