//! Error types shared by transports and the session.

/// Failures of the request/response transport.
///
/// Any of these ends the current exchange as failed. None are retried:
/// a send is a single attempt.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Connection-level failure (refused, reset, DNS, ...).
    #[error("network error: {0}")]
    Network(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The request did not complete in time.
    #[error("request timed out")]
    Timeout,

    /// The backend answered with a non-success status.
    #[error("server error: {status}: {body}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Response body, possibly empty.
        body: String,
    },

    /// The response carried no body to stream.
    #[error("no response body")]
    MissingBody,

    /// Reading the response stream failed after it started.
    #[error("stream error: {0}")]
    Stream(String),
}

impl TransportError {
    /// Whether the failure happened before any response bytes were read.
    #[must_use]
    pub fn is_before_stream(&self) -> bool {
        !matches!(self, Self::Stream(_))
    }
}
