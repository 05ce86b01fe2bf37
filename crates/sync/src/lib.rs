//! Reconciliation and synchronization engine.
//!
//! Ties the other crates together: the [`Tracker`] manages which remote apps
//! are tracked and which variants are selected, the [`CheckScheduler`]
//! enqueues periodic refreshes, and the two workers ([`CheckWorker`],
//! [`DownloadWorker`]) drain the durable queues. Everything is built around
//! at-least-once delivery: every worker entry point re-reads persisted state
//! and converges, so redelivered jobs are harmless.

pub mod error;

mod check;
mod download;
mod jobs;
mod progress;
mod reconcile;
mod scheduler;
mod selection;
mod tracker;

pub use self::check::{CheckOutcome, CheckWorker};
pub use self::download::{DownloadOutcome, DownloadWorker};
pub use self::jobs::{CHECK_QUEUE, CheckJob, DOWNLOAD_QUEUE, DownloadJob, check_job_options, download_job_options};
pub use self::progress::{NoProgress, ProgressReporter};
pub use self::reconcile::reconcile;
pub use self::scheduler::CheckScheduler;
pub use self::selection::apply_selection;
pub use self::tracker::{AddOutcome, Tracker};
