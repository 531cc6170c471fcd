//! Typed ID wrappers for thread, message and tool call identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Typed ID wrappers keep thread, message and tool call ids apart.
/// They are plain strings underneath; only uniqueness and creation order
/// matter, not the format.
macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Create a new typed ID from anything that converts to String.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Borrow the inner string.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_owned())
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }
    };
}

typed_id!(ThreadId, "Identifier for the backend conversation thread of one client session.");
typed_id!(MessageId, "Identifier for a transcript message.");
typed_id!(ToolCallId, "Identifier for a tool call record.");

/// Monotonic id source for transcript entities.
///
/// Ids are `msg-<n>` and `tool-<n>` with a single counter shared by both
/// kinds, so the numeric suffix also records creation order across them.
#[derive(Debug, Default, Clone)]
pub struct IdGenerator {
    next: u64,
}

impl IdGenerator {
    /// Create a generator starting at 1.
    pub fn new() -> Self {
        Self::default()
    }

    /// Produce the next message id.
    pub fn message(&mut self) -> MessageId {
        MessageId(format!("msg-{}", self.bump()))
    }

    /// Produce the next tool call id.
    pub fn tool_call(&mut self) -> ToolCallId {
        ToolCallId(format!("tool-{}", self.bump()))
    }

    fn bump(&mut self) -> u64 {
        self.next += 1;
        self.next
    }
}
