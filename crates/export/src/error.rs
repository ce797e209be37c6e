//! Export Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// An export error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for export operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The message sequence reported a different length than it yielded.
    #[display("declared {declared} messages but wrote {written}")]
    CountMismatch { declared: usize, written: usize },
    /// Writing the document (or persisting it to its destination) failed.
    #[display("I/O error")]
    Io,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io)
    }
}
