//! Immutable view of the transcript handed to presentation.

use serde::Serialize;
use transcript_types::Message;

/// A copy of the transcript and the streaming flag at one point in time.
///
/// Serializes as `{"messages": [...], "isStreaming": bool}`. Later
/// reductions never alter a snapshot that was already taken.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Messages in creation order.
    pub messages: Vec<Message>,
    /// Whether an exchange is in flight.
    pub is_streaming: bool,
}
