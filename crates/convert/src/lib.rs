//! Conversion of BlackBerry backups into "SMS Backup & Restore" XML.
//!
//! [`convert`] is the whole pipeline for a file on disk: detect the input
//! kind, unpack an archive if needed, stream the message sub-database out of
//! the container, decode each record and write the document. [`parse`] is the
//! same decoding over bytes already in memory, touching no files.

mod convert;
pub mod error;
mod input;
mod progress;

pub use crate::convert::{
    ConvertOptions, DatabaseSummary, Inventory, Selector, convert, inspect, inventory, parse, read_messages,
};
pub use crate::input::InputKind;
pub use crate::progress::{Event, Progress};
pub use ipdsms_export::ExportOptions;
pub use ipdsms_message::Message;
