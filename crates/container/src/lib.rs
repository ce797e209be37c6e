//! Reader for the "Inter@ctive Pager Backup/Restore File" container (IPD).
//!
//! An IPD file is a flat dump of several named sub-databases:
//!
//! ```text
//! "Inter@ctive Pager Backup/Restore File\n"   38-byte banner
//! version, _, count, _                        4 bytes
//! (len, _, name[len]) * count                 directory
//! (owner, _, length: u32 LE, payload) ...     data region, records interleaved
//! ```
//!
//! Reading walks those stages in order, each stage a separate type:
//! [`Container::open`] validates the banner, [`Container::enumerate`] reads the
//! directory into a [`Catalog`], and [`Catalog::records`] streams the
//! [`RawRecord`]s of one sub-database. A record's payload splits into
//! [`Field`]s via [`RawRecord::fields`].
//!
//! ```
//! use ipdsms_container::Container;
//! # use ipdsms_container::MAGIC;
//! # let mut bytes = MAGIC.to_vec();
//! # bytes.extend_from_slice(&[1, 0, 1, 0, 6, 0]);
//! # bytes.extend_from_slice(b"Memos\0");
//! use std::io::Cursor;
//!
//! let catalog = Container::open(Cursor::new(bytes)).unwrap().enumerate().unwrap();
//! let memos = catalog.directory().find(b"Memos\0").unwrap().index();
//! assert_eq!(catalog.records(memos).count(), 0);
//! ```

mod container;
mod directory;
pub mod error;
mod fields;
#[cfg(any(test, feature = "fixtures"))]
pub mod fixtures;
mod header;
mod records;
mod util;

pub use crate::container::{Catalog, Container};
pub use crate::directory::{Directory, SubDatabase};
pub use crate::fields::{Field, Fields};
pub use crate::header::{Header, MAGIC, check_magic_bytes};
pub use crate::records::{RawRecord, Records};
