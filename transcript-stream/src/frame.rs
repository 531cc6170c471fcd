//! Single-line frame parsing.
//!
//! A frame is one line of the form `data: <json>`. Lines without the marker
//! (blank SSE separators, comments, heartbeats) carry no event.

use transcript_types::Event;

/// Marker that prefixes every event line.
pub const DATA_PREFIX: &str = "data: ";

/// Why a line could not be turned into an [`Event`].
///
/// Frame errors never end a stream; the decoder logs and drops the line.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// The line is not valid UTF-8.
    #[error("invalid UTF-8 in frame: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    /// The payload after the marker is not a known event.
    #[error("malformed frame payload: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Parse one complete line (without its newline).
///
/// Returns `Ok(None)` for lines that do not start with [`DATA_PREFIX`].
pub fn parse_line(line: &str) -> Result<Option<Event>, FrameError> {
    let Some(payload) = line.strip_prefix(DATA_PREFIX) else {
        return Ok(None);
    };
    let event = serde_json::from_str(payload)?;
    Ok(Some(event))
}
