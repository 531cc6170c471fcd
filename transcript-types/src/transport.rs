//! The request/response boundary between the session and the backend.
//!
//! The [`ChatTransport`] trait uses RPITIT (return-position `impl Trait` in
//! traits) and is not object-safe; sessions are generic over it.

use std::future::Future;
use std::pin::Pin;

use futures::Stream;
use serde::{Deserialize, Serialize};

use crate::error::TransportError;
use crate::event::Event;
use crate::id::ThreadId;

/// Body of one chat request: `{"thread_id": ..., "message": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Session-wide thread id, reused for every exchange.
    pub thread_id: ThreadId,
    /// The user's text, exactly as submitted.
    pub message: String,
}

impl ChatRequest {
    /// Build a request for one exchange.
    pub fn new(thread_id: ThreadId, message: impl Into<String>) -> Self {
        Self {
            thread_id,
            message: message.into(),
        }
    }
}

/// Decoded events of one exchange, in arrival order.
///
/// The stream ends when the underlying response ends. An `Err` item means
/// the transport broke mid-stream; nothing follows it.
pub struct EventStream {
    /// The stream of events. Consume with `StreamExt::next()`.
    pub receiver: Pin<Box<dyn Stream<Item = Result<Event, TransportError>> + Send>>,
}

impl EventStream {
    /// Box any compatible stream.
    pub fn new(stream: impl Stream<Item = Result<Event, TransportError>> + Send + 'static) -> Self {
        Self {
            receiver: Box::pin(stream),
        }
    }
}

impl std::fmt::Debug for EventStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventStream").finish_non_exhaustive()
    }
}

/// Something that can dispatch a [`ChatRequest`] and hand back its events.
///
/// One call is one attempt; implementations do not retry.
pub trait ChatTransport: Send + Sync {
    /// Send the request and return the decoded event stream.
    ///
    /// Errors returned here happen before any response bytes are read.
    fn open(
        &self,
        request: ChatRequest,
    ) -> impl Future<Output = Result<EventStream, TransportError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[test]
    fn request_serializes_wire_field_names() {
        let req = ChatRequest::new(ThreadId::new("thread-1"), "hi");
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value, serde_json::json!({"thread_id": "thread-1", "message": "hi"}));
    }

    #[tokio::test]
    async fn event_stream_yields_in_order() {
        let mut stream = EventStream::new(futures::stream::iter(vec![
            Ok(Event::token("a")),
            Ok(Event::done()),
        ]));
        assert_eq!(stream.receiver.next().await.unwrap().unwrap(), Event::token("a"));
        assert!(stream.receiver.next().await.unwrap().unwrap().is_done());
        assert!(stream.receiver.next().await.is_none());
    }
}
