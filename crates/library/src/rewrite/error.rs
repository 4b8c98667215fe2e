//! Error types for the [`rewrite`](super) module.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A rewrite error with automatic location tracking via [`exn::Exn`].
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for rewrite operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The content glob patterns could not be expanded.
    #[display("could not enumerate content files")]
    Discovery,
    /// A content file could not be read as UTF-8 text.
    #[display("could not read content file: {}", _0.display())]
    Read(#[error(not(source))] PathBuf),
    /// A content file could not be written back.
    #[display("could not write content file: {}", _0.display())]
    Write(#[error(not(source))] PathBuf),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::Discovery)
    }
}
