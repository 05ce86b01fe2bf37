//! Queue Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction.

use derive_more::{Display, Error};

/// A queue error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for queue operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("queue database error")]
    Database,
    #[display("queue migration error")]
    Migration,
    /// A payload failed to (de)serialize.
    #[display("invalid job payload")]
    InvalidPayload,
}

/// What a job handler reports back to its queue.
///
/// `Ok(())` acknowledges the job; any error leaves it to the queue's
/// retry/backoff machinery. Handlers stringify their own error trees — the
/// queue only persists the rendered message alongside the attempt count.
pub type HandlerResult = std::result::Result<(), HandlerError>;

/// An opaque handler failure, recorded verbatim on the job row.
#[derive(Debug, Display, Error)]
#[display("{_0}")]
pub struct HandlerError(#[error(not(source))] String);

impl HandlerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}
