//! Scrape Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction, following the same shape as the other crates in this
//! workspace.

use derive_more::{Display, Error};

/// A scrape error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for gateway operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// Transient network failure talking to the remote catalog.
    #[display("network error: {_0}")]
    Network(#[error(not(source))] String),
    /// The remote page exists but could not be understood.
    #[display("unparseable remote page: {_0}")]
    Parse(#[error(not(source))] String),
    /// The remote catalog no longer serves the requested page.
    #[display("remote page not found: {_0}")]
    PageNotFound(#[error(not(source))] String),
    /// Declared size string did not match `"<digits-with-separators> bytes"`.
    #[display("invalid declared size: {_0:?}")]
    InvalidSize(#[error(not(source))] String),
    /// The release binary stream broke mid-transfer.
    #[display("stream error: {_0}")]
    Stream(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Network(_) | Self::PageNotFound(_) | Self::Stream(_))
    }
}
