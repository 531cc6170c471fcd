#![deny(missing_docs)]
//! Stream decoding and HTTP transport for the chat transcript client.
//!
//! The backend answers `POST /chat` with a chunked body of `data: <json>`
//! lines. [`FrameDecoder`] turns arbitrary byte chunks into [`Event`]s,
//! holding partial lines across chunk boundaries and dropping malformed
//! frames. [`HttpTransport`] implements [`ChatTransport`] on top of
//! `reqwest` and the decoder.
//!
//! [`Event`]: transcript_types::Event
//! [`ChatTransport`]: transcript_types::ChatTransport

mod client;
mod decoder;
mod error;
mod frame;

#[cfg(feature = "test-utils")]
pub mod test_utils;

pub use client::{BASE_URL_ENV, HttpTransport};
pub use decoder::{FrameDecoder, decode_stream};
pub use frame::{DATA_PREFIX, FrameError, parse_line};
