//! Container Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// A container error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for container operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The input does not start with the IPD banner; it is not a container at all.
    #[display("bad header")]
    InvalidHeader,
    /// The input ended part-way through a structure. Don't retry with the same input.
    #[display("truncated {_0}")]
    Truncated(#[error(not(source))] &'static str),
    /// Reading from the underlying stream failed.
    #[display("I/O error")]
    Io,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorKind::Io)
    }

    /// Returns `true` if the input itself is malformed (as opposed to unreadable).
    pub fn is_format(&self) -> bool {
        matches!(self, ErrorKind::InvalidHeader | ErrorKind::Truncated(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use exn::ResultExt;

    #[test]
    fn error_kind_display() {
        assert_eq!(ErrorKind::InvalidHeader.to_string(), "bad header");
        assert_eq!(ErrorKind::Truncated("record").to_string(), "truncated record");
        assert_eq!(ErrorKind::Io.to_string(), "I/O error");
    }

    #[test]
    fn error_kind_categories() {
        assert!(ErrorKind::InvalidHeader.is_format());
        assert!(ErrorKind::Truncated("field").is_format());
        assert!(!ErrorKind::Io.is_format());
        assert!(ErrorKind::Io.is_retryable());
        assert!(!ErrorKind::InvalidHeader.is_retryable());
    }

    #[test]
    fn error_from_result() {
        let result: std::result::Result<(), std::io::Error> =
            Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"));
        let err: Result<()> = result.or_raise(|| ErrorKind::Io);
        assert_eq!(*err.unwrap_err(), ErrorKind::Io);
    }
}
