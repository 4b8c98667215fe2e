//! Library Error Types
//!
//! Only run-level failures surface here. A single asset failing to optimize
//! is reported as an [`Outcome::Failed`](crate::optimize::Outcome::Failed)
//! instead.

use derive_more::{Display, Error};

/// A library error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// Target files could not be enumerated.
    #[display("could not discover media files")]
    Discovery,
    /// The cache could not be loaded or persisted.
    #[display("could not access the optimization cache")]
    Cache,
    /// Reference rewriting failed outside of a per-file run.
    #[display("could not rewrite references")]
    Rewrite,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Discovery | Self::Cache => true,
            Self::Rewrite => false,
        }
    }
}
