//! Top-level Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction.

use derive_more::{Display, Error};

/// A mirror startup/shutdown error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for mirror lifecycle operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// Configuration could not be loaded or failed validation.
    #[display("configuration error")]
    Config,
    /// The entity store could not be opened.
    #[display("entity store failure")]
    Store,
    /// The job queue could not be opened.
    #[display("job queue failure")]
    Queue,
    /// The artifact directory could not be opened.
    #[display("artifact store failure")]
    Artifact,
}
