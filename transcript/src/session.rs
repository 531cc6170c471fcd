//! One conversation thread driven over a [`ChatTransport`].

use futures::StreamExt;
use tokio::sync::watch;
use transcript_types::{ChatRequest, ChatTransport, ThreadId};

use crate::config::{SessionConfig, generate_thread_id};
use crate::reducer::{Applied, Reducer};
use crate::snapshot::Snapshot;

/// How a call to [`ChatSession::send_message`] ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeOutcome {
    /// Blank text or an exchange already in flight; nothing was sent.
    Ignored,
    /// The backend signalled completion.
    Completed,
    /// The stream ended without a completion status.
    Exhausted,
    /// The exchange ended with the failure message appended.
    Failed,
}

/// A chat session bound to one thread id.
///
/// The transcript lives inside the session. Consumers read it through
/// [`snapshot`](Self::snapshot) or follow it live through
/// [`subscribe`](Self::subscribe), which yields a new [`Snapshot`] after
/// every transition.
pub struct ChatSession<T> {
    transport: T,
    thread_id: ThreadId,
    reducer: Reducer,
    updates: watch::Sender<Snapshot>,
}

impl<T: ChatTransport> ChatSession<T> {
    /// Start a session on a fresh thread with default settings.
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, SessionConfig::default())
    }

    /// Start a session with explicit settings.
    pub fn with_config(transport: T, config: SessionConfig) -> Self {
        let thread_id = config.thread_id.unwrap_or_else(generate_thread_id);
        let reducer = Reducer::with_failure_text(config.failure_text);
        let (updates, _) = watch::channel(reducer.snapshot());
        tracing::debug!(thread_id = %thread_id, "chat session created");
        Self {
            transport,
            thread_id,
            reducer,
            updates,
        }
    }

    /// Thread id sent with every request of this session.
    pub fn thread_id(&self) -> &ThreadId {
        &self.thread_id
    }

    /// Current transcript and streaming flag.
    pub fn snapshot(&self) -> Snapshot {
        self.reducer.snapshot()
    }

    /// Whether an exchange is in flight.
    pub fn is_streaming(&self) -> bool {
        self.reducer.is_streaming()
    }

    /// Follow the transcript as it changes.
    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.updates.subscribe()
    }

    /// The underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Send `text` and stream the reply into the transcript.
    ///
    /// Resolves once the response stream is exhausted or the exchange has
    /// failed. Failures never surface as errors: they end up in the
    /// transcript as a single assistant failure message.
    pub async fn send_message(&mut self, text: &str) -> ExchangeOutcome {
        if !self.reducer.begin_exchange(text) {
            tracing::debug!(
                streaming = self.reducer.is_streaming(),
                "message ignored"
            );
            return ExchangeOutcome::Ignored;
        }
        self.publish();

        let request = ChatRequest::new(self.thread_id.clone(), text);
        let mut stream = match self.transport.open(request).await {
            Ok(stream) => stream,
            Err(err) => {
                tracing::error!(
                    error = %err,
                    before_stream = err.is_before_stream(),
                    thread_id = %self.thread_id,
                    "chat request failed"
                );
                return self.fail();
            }
        };

        let mut completed = false;
        while let Some(item) = stream.receiver.next().await {
            match item {
                Ok(event) => {
                    let applied = self.reducer.apply_event(event);
                    if applied != Applied::Ignored {
                        self.publish();
                    }
                    match applied {
                        Applied::Completed => completed = true,
                        Applied::Failed => return ExchangeOutcome::Failed,
                        Applied::Updated | Applied::Ignored => {}
                    }
                }
                Err(err) if completed => {
                    tracing::warn!(
                        error = %err,
                        before_stream = err.is_before_stream(),
                        "stream broke after completion"
                    );
                    break;
                }
                Err(err) => {
                    tracing::error!(
                        error = %err,
                        before_stream = err.is_before_stream(),
                        thread_id = %self.thread_id,
                        "response stream failed"
                    );
                    return self.fail();
                }
            }
        }

        if self.reducer.finish_exchange() {
            self.publish();
        }
        if completed {
            ExchangeOutcome::Completed
        } else {
            ExchangeOutcome::Exhausted
        }
    }

    fn fail(&mut self) -> ExchangeOutcome {
        self.reducer.end_exchange_with_failure();
        self.publish();
        ExchangeOutcome::Failed
    }

    fn publish(&self) {
        self.updates.send_replace(self.reducer.snapshot());
    }
}

impl<T> std::fmt::Debug for ChatSession<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatSession")
            .field("thread_id", &self.thread_id)
            .field("phase", &self.reducer.phase())
            .field("messages", &self.reducer.messages().len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use transcript_stream::test_utils::{Script, ScriptedTransport};
    use transcript_types::Role;

    fn contents(snapshot: &Snapshot) -> Vec<(Role, String)> {
        snapshot
            .messages
            .iter()
            .map(|m| (m.role, m.content.clone()))
            .collect()
    }

    #[tokio::test]
    async fn streams_tokens_into_one_assistant_message() {
        let transport = ScriptedTransport::new().then_frames([
            json!({"type": "token", "content": "Hel"}),
            json!({"type": "token", "content": "lo"}),
            json!({"type": "status", "status": "done"}),
        ]);
        let mut session = ChatSession::new(transport);

        let outcome = session.send_message("hi").await;

        assert_eq!(outcome, ExchangeOutcome::Completed);
        let snapshot = session.snapshot();
        assert!(!snapshot.is_streaming);
        assert_eq!(
            contents(&snapshot),
            vec![
                (Role::User, "hi".to_string()),
                (Role::Assistant, "Hello".to_string())
            ]
        );
    }

    #[tokio::test]
    async fn blank_message_is_not_sent() {
        let mut session = ChatSession::new(ScriptedTransport::new());
        assert_eq!(session.send_message("   ").await, ExchangeOutcome::Ignored);
        assert!(session.snapshot().messages.is_empty());
        assert!(session.transport().requests().is_empty());
    }

    #[tokio::test]
    async fn refused_connection_yields_one_failure_message() {
        let transport = ScriptedTransport::new().then_refuse("connection refused");
        let mut session = ChatSession::new(transport);

        assert_eq!(session.send_message("hi").await, ExchangeOutcome::Failed);
        let snapshot = session.snapshot();
        assert!(!snapshot.is_streaming);
        assert_eq!(
            contents(&snapshot),
            vec![
                (Role::User, "hi".to_string()),
                (Role::Assistant, "Error: Failed to get response".to_string())
            ]
        );
    }

    #[tokio::test]
    async fn http_status_failure_uses_configured_text() {
        let transport = ScriptedTransport::new().then(Script::Status(500, "boom".into()));
        let config = SessionConfig::default().with_failure_text("backend down");
        let mut session = ChatSession::with_config(transport, config);

        assert_eq!(session.send_message("hi").await, ExchangeOutcome::Failed);
        assert_eq!(session.snapshot().messages[1].content, "backend down");
    }

    #[tokio::test]
    async fn thread_id_is_reused_across_exchanges() {
        let transport = ScriptedTransport::new()
            .then_frames([json!({"type": "status", "status": "done"})])
            .then_frames([json!({"type": "status", "status": "done"})]);
        let config = SessionConfig::default().with_thread_id("thread-fixed");
        let mut session = ChatSession::with_config(transport, config);

        session.send_message("one").await;
        session.send_message("two").await;

        let requests = session.transport().requests();
        assert_eq!(requests.len(), 2);
        assert!(requests.iter().all(|r| r.thread_id.as_str() == "thread-fixed"));
        assert_eq!(requests[1].message, "two");
    }

    #[tokio::test]
    async fn subscribers_see_final_snapshot() {
        let transport = ScriptedTransport::new().then_frames([
            json!({"type": "token", "content": "ok"}),
            json!({"type": "status", "status": "done"}),
        ]);
        let mut session = ChatSession::new(transport);
        let mut updates = session.subscribe();

        session.send_message("hi").await;

        assert!(updates.has_changed().unwrap());
        let latest = updates.borrow_and_update().clone();
        assert_eq!(latest, session.snapshot());
    }

    #[test]
    fn debug_shows_thread_and_phase() {
        let session = ChatSession::with_config(
            ScriptedTransport::new(),
            SessionConfig::default().with_thread_id("thread-dbg"),
        );
        let debug = format!("{session:?}");
        assert!(debug.contains("thread-dbg"));
        assert!(debug.contains("Idle"));
    }
}
