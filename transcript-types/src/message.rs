//! Transcript entries: messages and the tool calls they carry.
//!
//! The serialized shape (camelCase fields, kebab-case tool call states) is the
//! one a browser rendering layer consumes directly.

use serde::{Deserialize, Serialize};

use crate::id::{MessageId, ToolCallId};

/// Author of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The person typing into the client.
    User,
    /// The streaming backend.
    Assistant,
}

/// Lifecycle state of a tool call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToolCallState {
    /// The invocation started; its input is known, its output is not.
    InputAvailable,
    /// The invocation completed and its output is attached.
    OutputAvailable,
    /// The invocation failed.
    ///
    /// The wire protocol carries no failure signal for individual tool
    /// calls, so the reducer never produces this state today.
    OutputError,
}

/// One tool invocation reported by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique id assigned when the call was recorded.
    pub id: ToolCallId,
    /// Tool identifier as reported on the wire.
    pub name: String,
    /// Tool input, opaque to the client.
    pub input: serde_json::Value,
    /// Tool output, absent until the call resolves.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<serde_json::Value>,
    /// Current lifecycle state.
    pub state: ToolCallState,
}

impl ToolCall {
    /// Create a freshly started call in [`ToolCallState::InputAvailable`].
    pub fn started(id: ToolCallId, name: impl Into<String>, input: serde_json::Value) -> Self {
        Self {
            id,
            name: name.into(),
            input,
            output: None,
            state: ToolCallState::InputAvailable,
        }
    }

    /// Whether the call is still waiting for its result.
    pub fn is_pending(&self) -> bool {
        self.state == ToolCallState::InputAvailable
    }

    /// Attach the output and mark the call resolved.
    pub fn resolve(&mut self, output: serde_json::Value) {
        self.output = Some(output);
        self.state = ToolCallState::OutputAvailable;
    }
}

/// A single transcript entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Unique id, assigned in creation order.
    pub id: MessageId,
    /// Who authored the message.
    pub role: Role,
    /// Accumulated text. Empty for an assistant message that so far only
    /// carries tool calls.
    pub content: String,
    /// Tool calls in the order they started; `None` until the first one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
}

impl Message {
    /// A user message with the submitted text.
    pub fn user(id: MessageId, content: impl Into<String>) -> Self {
        Self {
            id,
            role: Role::User,
            content: content.into(),
            tool_calls: None,
        }
    }

    /// An assistant message with initial content.
    pub fn assistant(id: MessageId, content: impl Into<String>) -> Self {
        Self {
            id,
            role: Role::Assistant,
            content: content.into(),
            tool_calls: None,
        }
    }

    /// Tool calls recorded on this message, empty if none.
    pub fn tool_calls(&self) -> &[ToolCall] {
        self.tool_calls.as_deref().unwrap_or_default()
    }

    /// Append a tool call, creating the sequence on first use.
    pub fn push_tool_call(&mut self, call: ToolCall) {
        self.tool_calls.get_or_insert_with(Vec::new).push(call);
    }

    /// First call with the given tool name, in stored order, whatever its
    /// state.
    ///
    /// The wire carries no call id, so several calls to the same tool all
    /// resolve to the earliest one.
    pub fn tool_call_mut(&mut self, name: &str) -> Option<&mut ToolCall> {
        self.tool_calls
            .as_mut()?
            .iter_mut()
            .find(|call| call.name == name)
    }
}
