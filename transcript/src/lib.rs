#![deny(missing_docs)]
//! Stream-to-transcript reconstruction for streaming chat backends.
//!
//! [`Reducer`] folds decoded [`Event`]s into an ordered transcript of
//! [`Message`]s while a response is still arriving. [`ChatSession`] drives
//! one exchange at a time: it records the user message, dispatches the
//! request through a [`ChatTransport`], applies each event in arrival order
//! and publishes a fresh [`Snapshot`] after every step.
//!
//! ```text
//! send_message ─► Reducer::begin_exchange ─► ChatTransport::open
//!                                                   │
//!          Snapshot ◄─ Reducer::apply_event ◄─ EventStream
//! ```
//!
//! [`Event`]: transcript_types::Event
//! [`Message`]: transcript_types::Message
//! [`ChatTransport`]: transcript_types::ChatTransport

pub mod config;
pub mod reducer;
pub mod session;
pub mod snapshot;

pub use config::SessionConfig;
pub use reducer::{Applied, ExchangePhase, Reducer};
pub use session::{ChatSession, ExchangeOutcome};
pub use snapshot::Snapshot;
