//! Error types for the [`optimize`](super) module.
//!
//! These never abort a run: they are captured in
//! [`Outcome::Failed`](super::Outcome::Failed) for the file they happened to.

use derive_more::{Display, Error};

/// An optimize error with automatic location tracking via [`exn::Exn`].
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for optimize operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Classifies which step of processing a single file failed.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// Reading, writing, stating or deleting an asset failed.
    #[display("filesystem operation failed")]
    Storage,
    /// The image could not be decoded or re-encoded at any quality.
    #[display("could not encode image")]
    Encode,
    /// The blocking encode task panicked or was cancelled.
    #[display("encoding task failed")]
    Task,
    /// The asset was renamed but references to it could not be rewritten.
    #[display("could not rewrite references to renamed asset")]
    Rewrite,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Storage | Self::Task)
    }
}
