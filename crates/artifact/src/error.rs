//! Artifact Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction.

use derive_more::{Display, Error};
use std::io::Error as IoError;
use std::path::PathBuf;

/// An artifact store error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for artifact operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// Root is not an absolute directory.
    #[display("invalid artifact root: {}", _0.display())]
    InvalidRoot(#[error(not(source))] PathBuf),
    /// Artifact name contains path separators or other hostile characters.
    #[display("invalid artifact name: {_0:?}")]
    InvalidName(#[error(not(source))] String),
    #[display("artifact not found: {_0}")]
    NotFound(#[error(not(source))] String),
    /// Underlying I/O error
    #[display("I/O error: {_0}")]
    Io(IoError),
}

impl From<IoError> for ErrorKind {
    fn from(err: IoError) -> Self {
        Self::Io(err)
    }
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io(_))
    }
}
