//! Access to the databases inside a BlackBerry Desktop backup (`.bbb`).
//!
//! A backup is a zip archive with a `Manifest.xml` at its root listing each
//! database by name and numeric `uid`; the database itself is stored as
//! `Databases/<uid>.dat`, in the same IPD container format as a bare `.ipd`.

mod archive;
pub mod error;
mod manifest;

pub use crate::archive::{Archive, Extracted, extract};
pub use crate::manifest::{MANIFEST, Manifest, ManifestEntry};

/// Leading bytes of a zip local file header.
pub const MAGIC: &[u8; 4] = b"PK\x03\x04";

/// Check whether `bytes` start like a zip archive.
pub fn check_magic_bytes(bytes: &[u8]) -> bool {
    bytes.starts_with(MAGIC)
}
