#![deny(missing_docs)]
//! Shared types for the streaming chat transcript client.
//!
//! Everything the decoder, the reducer and the presentation layer agree on
//! lives here:
//!
//! | Module | What it holds |
//! |--------|---------------|
//! | [`id`] | Typed identifiers for threads, messages and tool calls |
//! | [`message`] | [`Message`], [`ToolCall`] and their states |
//! | [`event`] | The wire [`Event`] carried by each stream frame |
//! | [`transport`] | The [`ChatTransport`] trait, [`ChatRequest`] and [`EventStream`] |
//! | [`error`] | [`TransportError`] |

pub mod error;
pub mod event;
pub mod id;
pub mod message;
pub mod transport;

pub use error::TransportError;
pub use event::{DONE_STATUS, Event};
pub use id::{IdGenerator, MessageId, ThreadId, ToolCallId};
pub use message::{Message, Role, ToolCall, ToolCallState};
pub use transport::{ChatRequest, ChatTransport, EventStream};
