//! In-memory transport for tests.
//!
//! Available behind the `test-utils` feature flag. [`ScriptedTransport`]
//! answers each `open` with the next scripted response. Chunked bodies go
//! through the real [`decode_stream`], so tests exercise the same framing
//! path as [`HttpTransport`](crate::HttpTransport).

use std::collections::VecDeque;
use std::future::Future;
use std::sync::Mutex;

use bytes::Bytes;
use transcript_types::{ChatRequest, ChatTransport, EventStream, TransportError};

use crate::decoder::decode_stream;

/// One scripted answer to an `open` call.
#[derive(Debug, Clone)]
pub enum Script {
    /// Stream these raw body chunks, then end normally.
    Chunks(Vec<Bytes>),
    /// Stream these chunks, then fail mid-stream with the given reason.
    ChunksThenBreak(Vec<Bytes>, String),
    /// Fail before any byte with a connection error.
    Refuse(String),
    /// Fail before any byte with an HTTP status.
    Status(u16, String),
}

/// Transport that replays scripted responses in order and records requests.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    scripts: Mutex<VecDeque<Script>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedTransport {
    /// Create a transport with no scripts. Opening it fails with a network error.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a script.
    #[must_use]
    pub fn then(self, script: Script) -> Self {
        lock(&self.scripts).push_back(script);
        self
    }

    /// Queue a body delivered as the given chunks.
    #[must_use]
    pub fn then_chunks<I, C>(self, chunks: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Bytes>,
    {
        self.then(Script::Chunks(chunks.into_iter().map(Into::into).collect()))
    }

    /// Queue a body of `data:` frames built from the given JSON payloads,
    /// delivered one frame per chunk.
    #[must_use]
    pub fn then_frames<I>(self, payloads: I) -> Self
    where
        I: IntoIterator<Item = serde_json::Value>,
    {
        self.then_chunks(
            payloads
                .into_iter()
                .map(|payload| format!("data: {payload}\n\n")),
        )
    }

    /// Queue a connection failure.
    #[must_use]
    pub fn then_refuse(self, reason: impl Into<String>) -> Self {
        self.then(Script::Refuse(reason.into()))
    }

    /// Requests received so far, in order.
    pub fn requests(&self) -> Vec<ChatRequest> {
        lock(&self.requests).clone()
    }

    fn next_script(&self) -> Option<Script> {
        lock(&self.scripts).pop_front()
    }
}

impl ChatTransport for ScriptedTransport {
    fn open(
        &self,
        request: ChatRequest,
    ) -> impl Future<Output = Result<EventStream, TransportError>> + Send {
        lock(&self.requests).push(request);
        let script = self.next_script();

        async move {
            match script {
                Some(Script::Chunks(chunks)) => {
                    let body = futures::stream::iter(chunks.into_iter().map(Ok));
                    Ok(EventStream::new(decode_stream(body)))
                }
                Some(Script::ChunksThenBreak(chunks, reason)) => {
                    let body = futures::stream::iter(
                        chunks
                            .into_iter()
                            .map(Ok)
                            .chain(std::iter::once(Err(TransportError::Stream(reason)))),
                    );
                    Ok(EventStream::new(decode_stream(body)))
                }
                Some(Script::Refuse(reason)) => Err(refused(reason)),
                Some(Script::Status(status, body)) => Err(TransportError::Http { status, body }),
                None => Err(refused("no scripted response".into())),
            }
        }
    }
}

fn refused(reason: String) -> TransportError {
    TransportError::Network(Box::new(std::io::Error::new(
        std::io::ErrorKind::ConnectionRefused,
        reason,
    )))
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
