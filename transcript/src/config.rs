//! Session configuration.

use transcript_types::ThreadId;

/// Default text of the assistant message appended when an exchange fails.
pub const DEFAULT_FAILURE_TEXT: &str = "Error: Failed to get response";

/// Configuration for a [`ChatSession`](crate::ChatSession).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Assistant message content appended when an exchange fails.
    pub failure_text: String,
    /// Conversation thread to resume. A fresh id is generated when `None`.
    pub thread_id: Option<ThreadId>,
}

impl SessionConfig {
    /// Resume an existing thread.
    #[must_use]
    pub fn with_thread_id(mut self, thread_id: impl Into<ThreadId>) -> Self {
        self.thread_id = Some(thread_id.into());
        self
    }

    /// Override the failure message text.
    #[must_use]
    pub fn with_failure_text(mut self, text: impl Into<String>) -> Self {
        self.failure_text = text.into();
        self
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            failure_text: DEFAULT_FAILURE_TEXT.into(),
            thread_id: None,
        }
    }
}

/// Generate a new thread id of the form `thread-<uuid>`.
pub fn generate_thread_id() -> ThreadId {
    ThreadId::new(format!("thread-{}", uuid::Uuid::new_v4()))
}
