//! Conversation session management.
//!
//! A `ChatSession` owns the visible message history and enforces
//! single-flight requests: the user turn is appended optimistically and
//! rolled back if its generation attempt fails.

mod chat;
mod manager;
mod types;

#[cfg(test)]
mod tests;

pub use manager::ChatSession;
pub use types::ErrorObserver;
