//! Async send and retry for ChatSession.

use tracing::debug;

use crate::Role;

use super::manager::ChatSession;
use super::types::{lock, PendingAttempt};

impl ChatSession {
    /// Send a user utterance and wait for the reply.
    ///
    /// Blank input and calls made while a request is pending are ignored.
    /// On failure the user turn is rolled back and `last_error` is set;
    /// nothing is returned to the caller either way.
    pub async fn send(&self, text: impl Into<String>) {
        let text = text.into();
        let Some((attempt, context)) = PendingAttempt::begin(&self.state, &text) else {
            debug!("send ignored: blank input or request already pending");
            return;
        };

        debug!(context_len = context.len(), "sending message");

        match self.client.generate(&text, &context).await {
            Ok(reply) => attempt.succeed(reply),
            Err(err) => {
                debug!(error = ?err, "generation failed; user message rolled back");
                attempt.fail(&err);
                if let Some(observer) = &self.on_error {
                    observer(&err);
                }
            }
        }
    }

    /// Re-send the last submitted utterance.
    ///
    /// No-op when nothing was ever sent (or the session was cleared) and
    /// while a request is pending. A trailing unanswered user turn is
    /// removed first so the retry does not duplicate it.
    pub async fn retry(&self) {
        let utterance = {
            let mut state = lock(&self.state);
            if state.last_user_utterance.is_empty() || state.pending {
                return;
            }
            if state.history.last().is_some_and(|m| m.role() == Role::User) {
                state.history.pop();
            }
            state.last_user_utterance.clone()
        };

        debug!("retrying last message");
        self.send(utterance).await;
    }
}
