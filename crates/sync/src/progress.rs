//! Progress reporting seam between the download worker and the queue.

use async_trait::async_trait;
use droidmirror_queue::JobContext;

/// Sink for fractional (0..=1) download progress.
///
/// Advisory only: implementations must never fail the surrounding work over
/// a progress hiccup.
#[async_trait]
pub trait ProgressReporter: Send + Sync {
    async fn report(&self, fraction: f64);
}

/// Reporter that discards everything. For one-shot and test invocations.
#[derive(Debug, Default)]
pub struct NoProgress;

#[async_trait]
impl ProgressReporter for NoProgress {
    async fn report(&self, _fraction: f64) {}
}

#[async_trait]
impl ProgressReporter for JobContext {
    async fn report(&self, fraction: f64) {
        self.report_progress(fraction).await;
    }
}
