//! Conversion Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction. Errors from the pipeline crates are
//! re-raised here with their own trees kept as children.

use derive_more::{Display, Error};
use ipdsms_archive::error::{Error as ArchiveError, ErrorKind as ArchiveErrorKind};
use ipdsms_container::error::{Error as ContainerError, ErrorKind as ContainerErrorKind};
use ipdsms_export::error::{Error as ExportError, ErrorKind as ExportErrorKind};
use ipdsms_message::error::{Error as MessageError, ErrorKind as MessageErrorKind};

/// A conversion error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for conversion operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The input is damaged or not a backup at all. Don't retry with the same input.
    #[display("format error: {_0}")]
    Format(#[error(not(source))] String),
    /// The input is valid but does not contain the requested database.
    #[display("not found: {_0}")]
    NotFound(#[error(not(source))] String),
    /// Reading the input or writing the output failed.
    #[display("I/O error")]
    Io,
    /// The caller asked for the conversion to stop.
    #[display("conversion cancelled")]
    Cancelled,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io | Self::Cancelled)
    }

    #[track_caller]
    pub fn container(err: ContainerError) -> Error {
        let kind = match &*err {
            ContainerErrorKind::Io => Self::Io,
            other => Self::Format(other.to_string()),
        };
        err.raise(kind)
    }

    #[track_caller]
    pub fn message(err: MessageError) -> Error {
        let kind = match &*err {
            MessageErrorKind::Container(ContainerErrorKind::Io) => Self::Io,
            MessageErrorKind::Container(other) => Self::Format(other.to_string()),
            other => Self::Format(other.to_string()),
        };
        err.raise(kind)
    }

    #[track_caller]
    pub fn archive(err: ArchiveError) -> Error {
        let kind = match &*err {
            ArchiveErrorKind::Io => Self::Io,
            ArchiveErrorKind::DatabaseNotFound(name) => Self::NotFound(name.clone()),
            ArchiveErrorKind::MissingEntry(entry) => Self::NotFound(entry.clone()),
            other => Self::Format(other.to_string()),
        };
        err.raise(kind)
    }

    #[track_caller]
    pub fn export(err: ExportError) -> Error {
        let kind = match &*err {
            ExportErrorKind::Io => Self::Io,
            other => Self::Format(other.to_string()),
        };
        err.raise(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(ContainerErrorKind::InvalidHeader, ErrorKind::Format("bad header".into()))]
    #[case(ContainerErrorKind::Truncated("record"), ErrorKind::Format("truncated record".into()))]
    #[case(ContainerErrorKind::Io, ErrorKind::Io)]
    fn from_container(#[case] inner: ContainerErrorKind, #[case] expected: ErrorKind) {
        assert_eq!(*ErrorKind::container(ContainerError::from(inner)), expected);
    }

    #[rstest]
    #[case(ArchiveErrorKind::InvalidArchive, ErrorKind::Format("not a zip archive".into()))]
    #[case(ArchiveErrorKind::DatabaseNotFound("SMS".into()), ErrorKind::NotFound("SMS".into()))]
    #[case(ArchiveErrorKind::MissingEntry("Databases/1.dat".into()), ErrorKind::NotFound("Databases/1.dat".into()))]
    #[case(ArchiveErrorKind::Io, ErrorKind::Io)]
    fn from_archive(#[case] inner: ArchiveErrorKind, #[case] expected: ErrorKind) {
        assert_eq!(*ErrorKind::archive(ArchiveError::from(inner)), expected);
    }

    #[test]
    fn from_message() {
        let malformed = MessageError::from(MessageErrorKind::MalformedField { kind: 1, length: 3 });
        assert_eq!(*ErrorKind::message(malformed), ErrorKind::Format("malformed field: type 1 with 3 bytes".into()));
        let truncated = MessageError::from(MessageErrorKind::Container(ContainerErrorKind::Truncated("field")));
        assert_eq!(*ErrorKind::message(truncated), ErrorKind::Format("truncated field".into()));
    }
}
