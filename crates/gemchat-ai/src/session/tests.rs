//! State-machine tests for ChatSession against a scripted backend.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use tokio::sync::Notify;

use super::*;
use crate::{AiClient, GeminiConfig, GenerationError, Message, Role, TextStream};

/// Backend that replays a fixed script of outcomes and records each call.
#[derive(Default)]
struct ScriptedClient {
    replies: Mutex<VecDeque<Result<String, GenerationError>>>,
    /// (utterance, contents of the history passed as context)
    calls: Mutex<Vec<(String, Vec<String>)>>,
    /// When set, every call waits for a permit before answering.
    gate: Option<Arc<Notify>>,
}

impl ScriptedClient {
    fn new(replies: Vec<Result<String, GenerationError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            ..Default::default()
        }
    }

    fn gated(replies: Vec<Result<String, GenerationError>>, gate: Arc<Notify>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::new(replies)
        }
    }

    fn calls(&self) -> Vec<(String, Vec<String>)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl AiClient for ScriptedClient {
    async fn generate(
        &self,
        utterance: &str,
        history: &[Message],
    ) -> Result<String, GenerationError> {
        self.calls.lock().unwrap().push((
            utterance.to_string(),
            history.iter().map(|m| m.content().to_string()).collect(),
        ));
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(GenerationError::Unknown("script exhausted".into())))
    }

    async fn generate_stream(
        &self,
        utterance: &str,
        history: &[Message],
    ) -> Result<TextStream, GenerationError> {
        let reply = self.generate(utterance, history).await?;
        Ok(futures_util::stream::iter(vec![Ok(reply)]).boxed())
    }
}

fn session_with(client: &Arc<ScriptedClient>) -> ChatSession {
    ChatSession::new(client.clone())
}

fn transcript(session: &ChatSession) -> Vec<(Role, String)> {
    session
        .messages()
        .into_iter()
        .map(|m| (m.role(), m.content().to_string()))
        .collect()
}

async fn wait_until_pending(session: &ChatSession) {
    while !session.is_pending() {
        tokio::task::yield_now().await;
    }
}

#[tokio::test]
async fn successful_send_appends_user_and_assistant() {
    let client = Arc::new(ScriptedClient::new(vec![Ok("Hi there".into())]));
    let session = session_with(&client);

    session.send("Hello").await;

    assert_eq!(
        transcript(&session),
        vec![
            (Role::User, "Hello".to_string()),
            (Role::Assistant, "Hi there".to_string()),
        ]
    );
    assert_eq!(session.last_error(), None);
    assert!(!session.is_pending());
}

#[tokio::test]
async fn successful_sends_double_history_in_call_order() {
    let replies = (0..4).map(|i| Ok(format!("reply {i}"))).collect();
    let client = Arc::new(ScriptedClient::new(replies));
    let session = session_with(&client);

    for i in 0..4 {
        session.send(format!("question {i}")).await;
    }

    assert_eq!(session.message_count(), 8);
    let messages = session.messages();
    for (i, pair) in messages.chunks(2).enumerate() {
        assert_eq!(pair[0].role(), Role::User);
        assert_eq!(pair[0].content(), format!("question {i}"));
        assert_eq!(pair[1].role(), Role::Assistant);
        assert_eq!(pair[1].content(), format!("reply {i}"));
    }
}

#[tokio::test]
async fn context_is_history_before_the_new_user_turn() {
    let client = Arc::new(ScriptedClient::new(vec![
        Ok("Hi there".into()),
        Ok("Fine".into()),
    ]));
    let session = session_with(&client);

    session.send("Hello").await;
    session.send("How are you?").await;

    let calls = client.calls();
    assert_eq!(calls[0], ("Hello".to_string(), vec![]));
    assert_eq!(
        calls[1],
        (
            "How are you?".to_string(),
            vec!["Hello".to_string(), "Hi there".to_string()]
        )
    );
}

#[tokio::test]
async fn quota_failure_rolls_back_and_records_error() {
    let client = Arc::new(ScriptedClient::new(vec![Err(GenerationError::classify(
        "HTTP 429: QUOTA_EXCEEDED",
    ))]));
    let session = session_with(&client);

    session.send("Hello").await;

    assert!(session.messages().is_empty());
    let error = session.last_error().unwrap();
    assert!(error.contains("quota exceeded"));
    assert_eq!(session.last_user_utterance(), "Hello");
    assert!(!session.is_pending());
}

#[tokio::test]
async fn failure_leaves_existing_history_untouched() {
    let client = Arc::new(ScriptedClient::new(vec![
        Ok("first reply".into()),
        Err(GenerationError::Unknown("boom".into())),
    ]));
    let session = session_with(&client);

    session.send("first").await;
    let before = session.messages();

    session.send("x").await;

    assert_eq!(session.messages(), before);
    assert!(!session.last_error().unwrap().is_empty());
}

#[tokio::test]
async fn blank_input_is_ignored() {
    let client = Arc::new(ScriptedClient::new(vec![Ok("unused".into())]));
    let session = session_with(&client);

    session.send("").await;
    session.send("   \n\t").await;

    assert!(session.messages().is_empty());
    assert_eq!(session.last_user_utterance(), "");
    assert!(client.calls().is_empty());
}

#[tokio::test]
async fn send_while_pending_is_ignored() {
    let gate = Arc::new(Notify::new());
    let client = Arc::new(ScriptedClient::gated(
        vec![Err(GenerationError::RateLimited), Ok("second".into())],
        gate.clone(),
    ));
    let session = session_with(&client);

    gate.notify_one();
    session.send("earlier").await;
    assert!(session.last_error().is_some());

    tokio::join!(session.send("first"), async {
        wait_until_pending(&session).await;
        let history_before = session.messages();
        let error_before = session.last_error();

        session.send("intruder").await;

        assert_eq!(session.messages(), history_before);
        assert_eq!(session.last_error(), error_before);
        assert_eq!(session.last_user_utterance(), "first");
        assert!(session.is_pending());
        gate.notify_one();
    });

    assert_eq!(client.calls().len(), 2);
    assert_eq!(
        transcript(&session),
        vec![
            (Role::User, "first".to_string()),
            (Role::Assistant, "second".to_string()),
        ]
    );
}

#[tokio::test]
async fn last_error_is_cleared_when_a_new_attempt_starts() {
    let gate = Arc::new(Notify::new());
    let client = Arc::new(ScriptedClient::gated(
        vec![Err(GenerationError::QuotaExceeded), Ok("ok".into())],
        gate.clone(),
    ));
    let session = session_with(&client);

    gate.notify_one();
    session.send("a").await;
    assert!(session.last_error().is_some());

    tokio::join!(session.send("b"), async {
        wait_until_pending(&session).await;
        assert_eq!(session.last_error(), None);
        assert_eq!(session.message_count(), 1);
        gate.notify_one();
    });
    assert_eq!(session.message_count(), 2);
}

#[tokio::test]
async fn retry_without_prior_attempt_is_noop() {
    let client = Arc::new(ScriptedClient::new(vec![Ok("unused".into())]));
    let session = session_with(&client);

    session.retry().await;

    assert!(session.messages().is_empty());
    assert_eq!(session.last_error(), None);
    assert!(client.calls().is_empty());
}

#[tokio::test]
async fn retry_resends_last_utterance_after_failure() {
    let client = Arc::new(ScriptedClient::new(vec![
        Err(GenerationError::RateLimited),
        Ok("Hi there".into()),
    ]));
    let session = session_with(&client);

    session.send("Hello").await;
    assert!(session.last_error().unwrap().contains("Rate limit"));

    session.retry().await;

    assert_eq!(
        transcript(&session),
        vec![
            (Role::User, "Hello".to_string()),
            (Role::Assistant, "Hi there".to_string()),
        ]
    );
    assert_eq!(session.last_error(), None);
    let calls = client.calls();
    assert_eq!(calls.len(), 2);
    assert_eq!(calls[1].0, "Hello");
}

#[tokio::test]
async fn retry_removes_trailing_unanswered_user_turn() {
    let client = Arc::new(ScriptedClient::new(vec![
        Err(GenerationError::Unknown("down".into())),
        Ok("answer".into()),
    ]));
    let session = session_with(&client).with_history(vec![Message::user("dangling")]);

    session.send("question").await;
    assert_eq!(transcript(&session), vec![(Role::User, "dangling".to_string())]);

    session.retry().await;

    assert_eq!(
        transcript(&session),
        vec![
            (Role::User, "question".to_string()),
            (Role::Assistant, "answer".to_string()),
        ]
    );
    assert_eq!(client.calls()[1], ("question".to_string(), vec![]));
}

#[tokio::test]
async fn seeded_last_utterance_can_be_retried() {
    let client = Arc::new(ScriptedClient::new(vec![Ok("from the new model".into())]));
    let session = session_with(&client)
        .with_history(vec![Message::user("Hello"), Message::assistant("Hi")])
        .with_last_utterance("Explain lifetimes");

    assert_eq!(session.last_user_utterance(), "Explain lifetimes");
    session.retry().await;

    assert_eq!(
        client.calls(),
        vec![(
            "Explain lifetimes".to_string(),
            vec!["Hello".to_string(), "Hi".to_string()]
        )]
    );
    assert_eq!(session.message_count(), 4);
}

#[tokio::test]
async fn retry_after_success_sends_the_utterance_again() {
    let client = Arc::new(ScriptedClient::new(vec![
        Ok("one".into()),
        Ok("two".into()),
    ]));
    let session = session_with(&client);

    session.send("again?").await;
    session.retry().await;

    assert_eq!(session.message_count(), 4);
    assert_eq!(client.calls()[1].1, vec!["again?".to_string(), "one".to_string()]);
}

#[tokio::test]
async fn clear_resets_everything() {
    let client = Arc::new(ScriptedClient::new(vec![
        Ok("reply".into()),
        Err(GenerationError::QuotaExceeded),
    ]));
    let session = session_with(&client);

    session.send("one").await;
    session.send("two").await;
    assert!(session.last_error().is_some());

    session.clear();

    assert!(session.messages().is_empty());
    assert_eq!(session.last_error(), None);
    assert_eq!(session.last_user_utterance(), "");

    // Nothing left to retry.
    session.retry().await;
    assert_eq!(client.calls().len(), 2);
}

#[tokio::test]
async fn clear_on_fresh_session_is_harmless() {
    let client = Arc::new(ScriptedClient::default());
    let session = session_with(&client);
    session.clear();
    assert!(session.messages().is_empty());
    assert_eq!(session.last_error(), None);
}

#[tokio::test]
async fn clear_while_pending_discards_the_late_reply() {
    let gate = Arc::new(Notify::new());
    let client = Arc::new(ScriptedClient::gated(vec![Ok("late".into())], gate.clone()));
    let session = session_with(&client);

    tokio::join!(session.send("question"), async {
        wait_until_pending(&session).await;
        session.clear();
        gate.notify_one();
    });

    assert!(session.messages().is_empty());
    assert!(!session.is_pending());
}

#[tokio::test]
async fn cancelled_send_rolls_back_and_releases_pending() {
    let gate = Arc::new(Notify::new());
    let client = Arc::new(ScriptedClient::gated(
        vec![Ok("never".into()), Ok("later".into())],
        gate.clone(),
    ));
    let session = session_with(&client);

    let result = tokio::time::timeout(Duration::from_millis(20), session.send("slow")).await;
    assert!(result.is_err());

    assert!(session.messages().is_empty());
    assert!(!session.is_pending());
    assert_eq!(session.last_user_utterance(), "slow");

    gate.notify_one();
    session.send("next").await;
    assert_eq!(session.message_count(), 2);
}

#[tokio::test]
async fn observer_sees_each_failure_only() {
    let seen = Arc::new(AtomicUsize::new(0));
    let seen_in_observer = seen.clone();
    let client = Arc::new(ScriptedClient::new(vec![
        Ok("fine".into()),
        Err(GenerationError::EmptyResponse),
    ]));
    let session = session_with(&client).with_error_observer(Box::new(move |err: &GenerationError| {
        assert_eq!(err, &GenerationError::EmptyResponse);
        seen_in_observer.fetch_add(1, Ordering::SeqCst);
    }));

    session.send("a").await;
    assert_eq!(seen.load(Ordering::SeqCst), 0);

    session.send("b").await;
    assert_eq!(seen.load(Ordering::SeqCst), 1);
    assert_eq!(
        session.last_error().as_deref(),
        Some("Empty response from Gemini API")
    );
}

#[tokio::test]
async fn timestamps_never_decrease() {
    let replies = (0..5).map(|i| Ok(format!("r{i}"))).collect();
    let client = Arc::new(ScriptedClient::new(replies));
    let session = session_with(&client);

    for i in 0..5 {
        session.send(format!("q{i}")).await;
    }

    let messages = session.messages();
    for pair in messages.windows(2) {
        assert!(pair[0].timestamp() <= pair[1].timestamp());
    }
}

#[tokio::test]
async fn message_ids_are_never_reused() {
    let client = Arc::new(ScriptedClient::new(vec![
        Err(GenerationError::RateLimited),
        Ok("ok".into()),
    ]));
    let session = session_with(&client);

    session.send("same").await;
    session.retry().await;

    let messages = session.messages();
    assert_ne!(messages[0].id(), messages[1].id());
}

#[test]
fn connect_rejects_empty_credential() {
    let result = ChatSession::connect(GeminiConfig::new(""));
    assert!(matches!(result, Err(GenerationError::InvalidCredential)));
}

#[test]
fn connect_accepts_non_blank_credential() {
    let session = ChatSession::connect(GeminiConfig::new("key")).unwrap();
    assert_eq!(session.message_count(), 0);
    assert!(!session.is_pending());
}
