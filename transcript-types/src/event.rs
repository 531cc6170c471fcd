//! Wire events carried by the response stream.
//!
//! Each frame's JSON payload is internally tagged by `type`:
//!
//! ```text
//! {"type":"token","content":"Hel"}
//! {"type":"tool_start","tool":"search","input":{"q":"x"}}
//! {"type":"tool_result","tool":"search","result":{"hits":3}}
//! {"type":"status","status":"done"}
//! {"type":"error","message":"model overloaded"}
//! ```

use serde::{Deserialize, Deserializer, Serialize};

/// The `status` value that terminates an exchange normally.
pub const DONE_STATUS: &str = "done";

const UNKNOWN_ERROR: &str = "Unknown error";

/// One decoded stream event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Incremental assistant text.
    Token {
        /// Text to append.
        content: String,
    },
    /// A tool invocation began.
    ToolStart {
        /// Tool name.
        tool: String,
        /// Tool input; `{}` when the frame omits it or sends `null`.
        #[serde(default = "empty_object", deserialize_with = "object_or_empty")]
        input: serde_json::Value,
    },
    /// A tool invocation completed.
    ToolResult {
        /// Tool name, used to find the pending call.
        tool: String,
        /// Tool output; `null` when the frame omits it.
        #[serde(default)]
        result: serde_json::Value,
    },
    /// Exchange status update. Only [`DONE_STATUS`] has meaning.
    Status {
        /// Status value.
        status: String,
    },
    /// The backend reports the exchange failed.
    Error {
        /// Human-readable reason; `"Unknown error"` when absent or empty.
        #[serde(default = "unknown_error", deserialize_with = "message_or_unknown")]
        message: String,
    },
}

impl Event {
    /// Short name of the event kind, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::Token { .. } => "token",
            Event::ToolStart { .. } => "tool_start",
            Event::ToolResult { .. } => "tool_result",
            Event::Status { .. } => "status",
            Event::Error { .. } => "error",
        }
    }

    /// Whether this is the terminal `status: done` event.
    pub fn is_done(&self) -> bool {
        matches!(self, Event::Status { status } if status == DONE_STATUS)
    }

    /// Convenience constructor for a token event.
    pub fn token(content: impl Into<String>) -> Self {
        Event::Token {
            content: content.into(),
        }
    }

    /// Convenience constructor for the terminal `done` status.
    pub fn done() -> Self {
        Event::Status {
            status: DONE_STATUS.into(),
        }
    }
}

fn empty_object() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

fn unknown_error() -> String {
    UNKNOWN_ERROR.into()
}

fn object_or_empty<'de, D>(deserializer: D) -> Result<serde_json::Value, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(if value.is_null() { empty_object() } else { value })
}

fn message_or_unknown<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let message = Option::<String>::deserialize(deserializer)?;
    Ok(message.filter(|m| !m.is_empty()).unwrap_or_else(unknown_error))
}
