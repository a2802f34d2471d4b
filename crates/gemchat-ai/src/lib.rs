//! Conversation engine for gemchat.
//!
//! Provides:
//! - A Gemini client for the Generative Language API, with a lazily
//!   consumed streaming variant
//! - Context-window prompt construction
//! - `ChatSession`, the single-flight conversation state machine with
//!   optimistic append and rollback on failure

pub mod gemini;
pub mod message;
pub mod models;
pub mod prompt;
pub mod session;
pub mod streaming;

use async_trait::async_trait;
use futures_util::stream::BoxStream;

pub use gemini::{GeminiClient, GeminiConfig};
pub use message::{Message, Role};
pub use models::{ModelInfo, DEFAULT_MODEL, MODELS};
pub use prompt::{build_prompt, CONTEXT_WINDOW};
pub use session::{ChatSession, ErrorObserver};

/// A finite, non-restartable sequence of generated text chunks.
///
/// Dropping the stream aborts the underlying transfer.
pub type TextStream = BoxStream<'static, Result<String, GenerationError>>;

/// One remote text-generation backend.
///
/// Implementations hold no per-conversation state: everything needed for
/// a request arrives through the arguments, and every call issues at most
/// one remote request.
#[async_trait]
pub trait AiClient: Send + Sync {
    /// Generate a complete reply to `utterance`, with `history` as context.
    async fn generate(&self, utterance: &str, history: &[Message])
        -> Result<String, GenerationError>;

    /// Start a streamed reply to `utterance`, with `history` as context.
    async fn generate_stream(
        &self,
        utterance: &str,
        history: &[Message],
    ) -> Result<TextStream, GenerationError>;
}

/// Classified failure of a generation request.
///
/// `Display` yields the message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    #[error("Invalid API key. Please check your Gemini API key.")]
    InvalidCredential,
    #[error("API quota exceeded. Please try again later.")]
    QuotaExceeded,
    #[error("Rate limit exceeded. Please wait a moment before trying again.")]
    RateLimited,
    #[error("Empty response from Gemini API")]
    EmptyResponse,
    /// Transport or unclassified failure. The payload is the raw detail,
    /// kept for logs only.
    #[error("Failed to generate response. Please try again.")]
    Unknown(String),
}

impl GenerationError {
    /// Classify a remote failure from its error text.
    pub fn classify(text: &str) -> Self {
        if text.contains("API_KEY_INVALID") {
            GenerationError::InvalidCredential
        } else if text.contains("QUOTA_EXCEEDED") {
            GenerationError::QuotaExceeded
        } else if text.contains("RATE_LIMIT_EXCEEDED") {
            GenerationError::RateLimited
        } else {
            GenerationError::Unknown(text.to_string())
        }
    }
}
