//! Chunk-to-event decoding.
//!
//! The decoder works on raw bytes so that neither a frame nor a multi-byte
//! UTF-8 character split across chunks is lost:
//!
//! ```text
//! chunk 1: data: {"type":"token","content":"Hel
//! chunk 2: "}\ndata: {"type":"token","content":"lo"}\n
//! ```
//!
//! yields `token("Hel")` after chunk 2, then `token("lo")`.

use futures::{Stream, StreamExt};
use transcript_types::{Event, TransportError};

use crate::frame::{FrameError, parse_line};

/// Incremental decoder from byte chunks to [`Event`]s.
///
/// Everything after the last newline is held back and prepended to the next
/// chunk. Only newline delimiters (and a `\r` right before one) are
/// discarded.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buf: Vec<u8>,
    dropped: u64,
}

impl FrameDecoder {
    /// Create an empty decoder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk and return the events of every line it completes.
    pub fn decode(&mut self, chunk: &[u8]) -> Vec<Event> {
        self.buf.extend_from_slice(chunk);

        let Some(last_newline) = self.buf.iter().rposition(|b| *b == b'\n') else {
            return Vec::new();
        };
        let tail = self.buf.split_off(last_newline + 1);
        let complete = std::mem::replace(&mut self.buf, tail);

        complete[..last_newline]
            .split(|b| *b == b'\n')
            .filter_map(|line| self.decode_line(line))
            .collect()
    }

    /// Flush the held-back fragment once the stream has ended.
    ///
    /// A final line without a trailing newline is still a frame. This
    /// deliberately differs from clients that discard the leftover fragment
    /// at end of stream: a backend that omits the last newline does not lose
    /// its final event here.
    pub fn finish(&mut self) -> Option<Event> {
        let rest = std::mem::take(&mut self.buf);
        if rest.is_empty() {
            return None;
        }
        self.decode_line(&rest)
    }

    /// Number of frames dropped as malformed so far.
    pub fn dropped_frames(&self) -> u64 {
        self.dropped
    }

    /// Bytes currently held back waiting for a newline.
    pub fn pending_bytes(&self) -> usize {
        self.buf.len()
    }

    fn decode_line(&mut self, line: &[u8]) -> Option<Event> {
        let line = line.strip_suffix(b"\r").unwrap_or(line);
        let parsed = std::str::from_utf8(line)
            .map_err(FrameError::from)
            .and_then(parse_line);
        match parsed {
            Ok(Some(event)) => Some(event),
            Ok(None) => {
                if !line.is_empty() {
                    tracing::trace!(len = line.len(), "ignoring non-data line");
                }
                None
            }
            Err(e) => {
                self.dropped += 1;
                tracing::warn!(
                    error = %e,
                    line = %String::from_utf8_lossy(line),
                    "dropping malformed frame"
                );
                None
            }
        }
    }
}

/// Decode a byte stream into an event stream.
///
/// Items are forwarded as soon as their line is complete. A transport error
/// is forwarded once and ends the stream; a malformed frame never does.
pub fn decode_stream<S, B>(
    byte_stream: S,
) -> impl Stream<Item = Result<Event, TransportError>> + Send + 'static
where
    S: Stream<Item = Result<B, TransportError>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
{
    async_stream::stream! {
        let mut decoder = FrameDecoder::new();
        let mut byte_stream = std::pin::pin!(byte_stream);

        while let Some(chunk_result) = byte_stream.next().await {
            let chunk = match chunk_result {
                Ok(chunk) => chunk,
                Err(e) => {
                    yield Err(e);
                    return;
                }
            };
            for event in decoder.decode(chunk.as_ref()) {
                yield Ok(event);
            }
        }

        if let Some(event) = decoder.finish() {
            yield Ok(event);
        }
        if decoder.dropped_frames() > 0 {
            tracing::debug!(dropped = decoder.dropped_frames(), "stream ended with dropped frames");
        }
    }
}
