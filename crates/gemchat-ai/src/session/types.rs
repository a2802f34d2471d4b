//! Session state and the in-flight attempt guard.

use std::sync::{Mutex, MutexGuard, PoisonError};

use gemchat_common::MessageId;
use tracing::debug;

use crate::{GenerationError, Message, Role};

/// Callback notified with the classified error of every failed attempt.
pub type ErrorObserver = Box<dyn Fn(&GenerationError) + Send + Sync>;

#[derive(Debug, Default)]
pub(super) struct SessionState {
    pub(super) history: Vec<Message>,
    pub(super) pending: bool,
    pub(super) last_error: Option<String>,
    pub(super) last_user_utterance: String,
    /// Bumped by `clear`. An attempt begun under an older epoch discards
    /// its outcome instead of touching the new conversation.
    pub(super) epoch: u64,
}

impl SessionState {
    /// Append a message, keeping timestamps non-decreasing.
    pub(super) fn push(&mut self, role: Role, content: impl Into<String>) -> MessageId {
        let floor = self.history.last().map(Message::timestamp);
        let msg = Message::not_before(role, content, floor);
        let id = msg.id().clone();
        self.history.push(msg);
        id
    }

    pub(super) fn remove(&mut self, id: &MessageId) {
        if let Some(pos) = self.history.iter().rposition(|m| m.id() == id) {
            self.history.remove(pos);
        }
    }

    pub(super) fn reset(&mut self) {
        self.history.clear();
        self.last_error = None;
        self.last_user_utterance.clear();
        self.epoch = self.epoch.wrapping_add(1);
    }
}

/// Lock the session state. A panic never happens while the lock is held,
/// so a poisoned lock still guards consistent data.
pub(super) fn lock(state: &Mutex<SessionState>) -> MutexGuard<'_, SessionState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// One outstanding send.
///
/// Holds `pending` for as long as it lives. Dropping it without settling
/// (the send future was cancelled) rolls back the user turn.
pub(super) struct PendingAttempt<'a> {
    state: &'a Mutex<SessionState>,
    user_message: MessageId,
    epoch: u64,
    settled: bool,
}

impl<'a> PendingAttempt<'a> {
    /// Begin an attempt for `text`.
    ///
    /// Returns `None` without touching the state when `text` is blank or
    /// another attempt is pending. Otherwise returns the guard plus the
    /// history as it was before the user turn was appended.
    pub(super) fn begin(state: &'a Mutex<SessionState>, text: &str) -> Option<(Self, Vec<Message>)> {
        let mut guard = lock(state);
        if text.trim().is_empty() || guard.pending {
            return None;
        }

        guard.pending = true;
        guard.last_error = None;
        guard.last_user_utterance = text.to_string();
        let context = guard.history.clone();
        let user_message = guard.push(Role::User, text);

        let attempt = Self {
            state,
            user_message,
            epoch: guard.epoch,
            settled: false,
        };
        Some((attempt, context))
    }

    pub(super) fn succeed(mut self, reply: String) {
        let mut guard = lock(self.state);
        if guard.epoch == self.epoch {
            guard.push(Role::Assistant, reply);
        } else {
            debug!("conversation cleared while request was in flight; reply discarded");
        }
        guard.pending = false;
        self.settled = true;
    }

    pub(super) fn fail(mut self, err: &GenerationError) {
        let mut guard = lock(self.state);
        if guard.epoch == self.epoch {
            guard.remove(&self.user_message);
            guard.last_error = Some(err.to_string());
        }
        guard.pending = false;
        self.settled = true;
    }
}

impl Drop for PendingAttempt<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        debug!("send cancelled; rolling back user message");
        let mut guard = lock(self.state);
        if guard.epoch == self.epoch {
            guard.remove(&self.user_message);
        }
        guard.pending = false;
    }
}
