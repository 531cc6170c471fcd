//! Folding stream events into the transcript.
//!
//! The [`Reducer`] owns the message list and the per-exchange state: the
//! phase, the text accumulated for the current assistant message, and which
//! message that is. Every mutation goes through one of its operations, and
//! each operation is infallible: events that cannot be applied are dropped
//! and logged, never surfaced as errors.

use serde::Serialize;
use transcript_types::{DONE_STATUS, Event, IdGenerator, Message, Role, ToolCall};

use crate::config::DEFAULT_FAILURE_TEXT;
use crate::snapshot::Snapshot;

/// Where the current exchange stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExchangePhase {
    /// No exchange has started yet.
    #[default]
    Idle,
    /// The user message is recorded, no event has arrived yet.
    Sending,
    /// At least one event has arrived and the exchange is still open.
    Streaming,
    /// The exchange ended normally.
    Done,
    /// The exchange ended with a failure message.
    Failed,
}

impl ExchangePhase {
    /// Whether an exchange is in flight.
    pub fn is_streaming(self) -> bool {
        matches!(self, Self::Sending | Self::Streaming)
    }
}

/// What applying one event did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// The transcript changed.
    Updated,
    /// The event had no effect.
    Ignored,
    /// The event closed the exchange normally.
    Completed,
    /// The event closed the exchange with a failure.
    Failed,
}

/// Transcript state machine.
///
/// ```text
/// Idle ─begin─► Sending ─event─► Streaming ─done──────► Done
///                  │                 │
///                  └──── error / transport failure ───► Failed
/// ```
///
/// `Done` and `Failed` accept a new `begin_exchange`.
#[derive(Debug)]
pub struct Reducer {
    messages: Vec<Message>,
    phase: ExchangePhase,
    /// Text accumulated for the current assistant message.
    buffer: String,
    /// Index of the assistant message the current exchange writes into.
    current: Option<usize>,
    /// Index of the first message after the current exchange's user message.
    /// Earlier messages are frozen.
    exchange_start: usize,
    ids: IdGenerator,
    failure_text: String,
}

impl Reducer {
    /// Empty transcript, idle, with the default failure text.
    pub fn new() -> Self {
        Self::with_failure_text(DEFAULT_FAILURE_TEXT)
    }

    /// Empty transcript using `text` as the failure message content.
    pub fn with_failure_text(text: impl Into<String>) -> Self {
        Self {
            messages: Vec::new(),
            phase: ExchangePhase::Idle,
            buffer: String::new(),
            current: None,
            exchange_start: 0,
            ids: IdGenerator::new(),
            failure_text: text.into(),
        }
    }

    /// Start an exchange by appending a user message.
    ///
    /// Returns `false` and changes nothing when `text` is blank or an
    /// exchange is already in flight.
    pub fn begin_exchange(&mut self, text: &str) -> bool {
        if text.trim().is_empty() || self.phase.is_streaming() {
            return false;
        }

        let id = self.ids.message();
        self.messages.push(Message::user(id, text));
        self.exchange_start = self.messages.len();
        self.phase = ExchangePhase::Sending;
        self.buffer.clear();
        self.current = None;
        true
    }

    /// Apply one decoded event.
    ///
    /// A `tool_result` resolves the first call with the same tool name,
    /// scanning this exchange's assistant messages newest-first. Messages of
    /// earlier exchanges are never touched. An `error` arriving after the
    /// exchange completed is ignored.
    pub fn apply_event(&mut self, event: Event) -> Applied {
        tracing::trace!(kind = event.kind(), phase = ?self.phase, "applying event");
        if self.phase == ExchangePhase::Sending {
            self.phase = ExchangePhase::Streaming;
        }

        match event {
            Event::Token { content } => {
                self.buffer.push_str(&content);
                match self.current {
                    Some(index) => self.messages[index].content.clone_from(&self.buffer),
                    None => {
                        let content = self.buffer.clone();
                        self.push_assistant(content);
                    }
                }
                Applied::Updated
            }
            Event::ToolStart { tool, input } => {
                let index = self.current_assistant();
                let call = ToolCall::started(self.ids.tool_call(), tool, input);
                self.messages[index].push_tool_call(call);
                Applied::Updated
            }
            Event::ToolResult { tool, result } => {
                let start = self.exchange_start.min(self.messages.len());
                let matched = self.messages[start..]
                    .iter_mut()
                    .rev()
                    .filter(|message| message.role == Role::Assistant)
                    .find_map(|message| message.tool_call_mut(&tool));
                match matched {
                    Some(call) => {
                        if !call.is_pending() {
                            tracing::debug!(tool = %tool, id = %call.id, "overwriting resolved tool call");
                        }
                        call.resolve(result);
                        Applied::Updated
                    }
                    None => {
                        tracing::debug!(tool = %tool, "tool result without a matching call");
                        Applied::Ignored
                    }
                }
            }
            Event::Status { status } if status == DONE_STATUS => {
                tracing::debug!(messages = self.messages.len(), "exchange complete");
                self.phase = ExchangePhase::Done;
                self.buffer.clear();
                self.current = None;
                Applied::Completed
            }
            Event::Status { status } => {
                tracing::debug!(status = %status, "ignoring status");
                Applied::Ignored
            }
            Event::Error { message } if self.phase == ExchangePhase::Done => {
                tracing::warn!(error = %message, "ignoring error after completion");
                Applied::Ignored
            }
            Event::Error { message } => {
                tracing::error!(error = %message, "backend reported an error");
                self.end_exchange_with_failure();
                Applied::Failed
            }
        }
    }

    /// Close the exchange by appending the failure message.
    pub fn end_exchange_with_failure(&mut self) {
        let text = self.failure_text.clone();
        self.push_assistant(text);
        self.phase = ExchangePhase::Failed;
        self.buffer.clear();
        self.current = None;
    }

    /// Close an exchange whose stream ended without a completion status.
    ///
    /// Returns whether an in-flight exchange was closed.
    pub fn finish_exchange(&mut self) -> bool {
        if !self.phase.is_streaming() {
            return false;
        }
        tracing::warn!("stream ended before the exchange completed");
        self.phase = ExchangePhase::Done;
        self.buffer.clear();
        self.current = None;
        true
    }

    /// Copy of the transcript and streaming flag.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            messages: self.messages.clone(),
            is_streaming: self.is_streaming(),
        }
    }

    /// Messages in creation order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Current phase.
    pub fn phase(&self) -> ExchangePhase {
        self.phase
    }

    /// Whether an exchange is in flight.
    pub fn is_streaming(&self) -> bool {
        self.phase.is_streaming()
    }

    /// Text accumulated for the current assistant message.
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    fn current_assistant(&mut self) -> usize {
        match self.current {
            Some(index) => index,
            None => self.push_assistant(String::new()),
        }
    }

    fn push_assistant(&mut self, content: String) -> usize {
        let id = self.ids.message();
        self.messages.push(Message::assistant(id, content));
        let index = self.messages.len() - 1;
        self.current = Some(index);
        index
    }
}

impl Default for Reducer {
    fn default() -> Self {
        Self::new()
    }
}
