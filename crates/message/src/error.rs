//! Message Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use ipdsms_container::error::{Error as ContainerError, ErrorKind as ContainerErrorKind};

/// A message decoding error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for message decoding operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// A known field was too short to hold the data it always carries.
    #[display("malformed field: type {kind} with {length} bytes")]
    MalformedField {
        /// The field's type tag.
        kind: u8,
        /// Number of data bytes the field actually had.
        length: usize,
    },
    /// The record could not be split into fields.
    #[display("container error: {_0}")]
    Container(ContainerErrorKind),
}

impl ErrorKind {
    /// Convert a container error into a message error, preserving the
    /// container crate's `Exn` frame as a child in its own error tree.
    #[track_caller]
    pub fn container(err: ContainerError) -> Error {
        let inner = (*err).clone();
        err.raise(ErrorKind::Container(inner))
    }

    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::MalformedField { .. } => false,
            Self::Container(inner) => inner.is_retryable(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_kind_display() {
        assert_eq!(
            ErrorKind::MalformedField { kind: 1, length: 12 }.to_string(),
            "malformed field: type 1 with 12 bytes"
        );
        assert_eq!(
            ErrorKind::Container(ContainerErrorKind::Truncated("field")).to_string(),
            "container error: truncated field"
        );
    }

    #[test]
    fn container_error_keeps_kind() {
        let err = ErrorKind::container(ContainerError::from(ContainerErrorKind::Truncated("record")));
        assert_eq!(*err, ErrorKind::Container(ContainerErrorKind::Truncated("record")));
        assert!(!err.is_retryable());
    }
}
