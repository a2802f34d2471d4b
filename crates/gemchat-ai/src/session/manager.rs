//! ChatSession struct, construction, and state accessors.

use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::{AiClient, GeminiClient, GeminiConfig, GenerationError, Message};

use super::types::{lock, ErrorObserver, SessionState};

/// A single conversation with one remote backend.
///
/// All methods take `&self`; the state lock is never held across an
/// `.await`, so callers can observe `is_pending()` while a send is in
/// flight, and a second `send` issued meanwhile is ignored.
pub struct ChatSession {
    pub(super) client: Arc<dyn AiClient>,
    pub(super) state: Mutex<SessionState>,
    pub(super) on_error: Option<ErrorObserver>,
}

impl ChatSession {
    pub fn new(client: Arc<dyn AiClient>) -> Self {
        Self {
            client,
            state: Mutex::new(SessionState::default()),
            on_error: None,
        }
    }

    /// Build a Gemini-backed session. Fails with `InvalidCredential` for a
    /// blank API key.
    pub fn connect(config: GeminiConfig) -> Result<Self, GenerationError> {
        let client = GeminiClient::new(config)?;
        debug!(model = client.model(), "session connected");
        Ok(Self::new(Arc::new(client)))
    }

    /// Seed the session with an existing transcript.
    pub fn with_history(self, history: Vec<Message>) -> Self {
        lock(&self.state).history = history;
        self
    }

    /// Seed the text `retry` re-sends, e.g. when moving a conversation to
    /// another client after a failed attempt.
    pub fn with_last_utterance(self, text: impl Into<String>) -> Self {
        lock(&self.state).last_user_utterance = text.into();
        self
    }

    pub fn with_error_observer(mut self, observer: ErrorObserver) -> Self {
        self.on_error = Some(observer);
        self
    }

    /// Snapshot of the conversation, oldest first.
    pub fn messages(&self) -> Vec<Message> {
        lock(&self.state).history.clone()
    }

    pub fn message_count(&self) -> usize {
        lock(&self.state).history.len()
    }

    /// Whether a generation request is outstanding.
    pub fn is_pending(&self) -> bool {
        lock(&self.state).pending
    }

    /// User-facing description of the most recent failure, if any.
    pub fn last_error(&self) -> Option<String> {
        lock(&self.state).last_error.clone()
    }

    /// The most recently submitted text, kept for `retry` even after rollback.
    pub fn last_user_utterance(&self) -> String {
        lock(&self.state).last_user_utterance.clone()
    }

    /// Drop the whole conversation, the last error and the retry text.
    pub fn clear(&self) {
        lock(&self.state).reset();
        debug!("conversation cleared");
    }
}
