//! Serialization of decoded messages into the "SMS Backup & Restore" XML
//! schema: a root `smses` element whose `count` equals the number of `sms`
//! children, each child a flat set of attributes.

mod encode;
pub mod error;
mod export;
mod exported;

pub use crate::encode::html_encode;
pub use crate::export::{DEFAULT_STYLESHEET, ExportOptions, Exporter, TempFile};
pub use crate::exported::{Body, ExportedMessage, MessageType, UNSET_READABLE_DATE};
