//! Sync Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction. Each variant names the subsystem a failure came from;
//! the underlying error tree carries the detail.

use derive_more::{Display, Error};

/// A synchronization error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for synchronization operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The entity store failed underneath a worker.
    #[display("entity store failure")]
    Store,
    /// The scraper gateway failed (fetch, parse, or mid-stream).
    #[display("scraper gateway failure")]
    Scrape,
    /// Writing a downloaded release to the artifact directory failed.
    #[display("artifact store failure")]
    Artifact,
    /// The job queue refused an enqueue or settle.
    #[display("job queue failure")]
    Queue,
    /// An operation referenced an app that is not tracked.
    #[display("app is not tracked: {_0}")]
    UnknownApp(#[error(not(source))] String),
    /// The release page listed no build matching the variant's selectors.
    /// Retryable: the remote list is sometimes populated lazily.
    #[display("no release matches selectors ({arch}, {android_version}, {density})")]
    NoMatchingRelease { arch: String, android_version: String, density: String },
}

impl ErrorKind {
    /// Returns `true` if retrying (with backoff) might succeed.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::UnknownApp(_))
    }
}
