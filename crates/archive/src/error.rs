//! Archive Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// An archive error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for archive operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The input is not a readable zip archive.
    #[display("not a zip archive")]
    InvalidArchive,
    /// The archive has no `Manifest.xml`; it is not a device backup.
    #[display("archive has no manifest")]
    MissingManifest,
    /// The manifest is not well-formed, or a matching entry has no usable id.
    #[display("malformed manifest: {_0}")]
    MalformedManifest(#[error(not(source))] String),
    /// No manifest entry carries the requested database name.
    #[display("database not found in manifest: {_0}")]
    DatabaseNotFound(#[error(not(source))] String),
    /// The manifest names an entry the archive does not contain.
    #[display("archive entry not found: {_0}")]
    MissingEntry(#[error(not(source))] String),
    /// Reading the archive or writing the scratch directory failed.
    #[display("I/O error")]
    Io,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io)
    }

    /// Returns `true` if the archive is well-formed but lacks what was asked for.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::DatabaseNotFound(_) | Self::MissingEntry(_))
    }
}
