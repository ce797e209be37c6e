//! Decoding of short-message records from an IPD container.
//!
//! A record's fields are folded into a [`Message`] by [`decode`]; the body
//! stays in its stored form until [`Message::text`] runs it through the
//! matching [`TextEncoding`].

pub mod codec;
mod consts;
mod decode;
pub mod error;
pub mod models;

pub use crate::codec::TextEncoding;
pub use crate::decode::{MessageBuilder, decode};
pub use crate::models::{Direction, Message};
