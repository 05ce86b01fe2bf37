//! Periodic scheduling of update checks.

use crate::error::{ErrorKind, Result};
use crate::jobs::{CHECK_QUEUE, CheckJob, check_job_options};
use droidmirror_queue::Queue;
use droidmirror_store::AppRepository;
use exn::ResultExt;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Enqueues a check for every tracked app on a fixed interval.
///
/// The scheduler is fire-and-forget: it never waits for checks to finish,
/// and a pass that fails (store down, queue full) is logged and retried on
/// the next tick rather than aborting the loop.
pub struct CheckScheduler {
    apps: AppRepository,
    queue: Queue,
    period: Duration,
}

impl CheckScheduler {
    pub fn new(apps: AppRepository, queue: Queue, period: Duration) -> Self {
        Self { apps, queue, period }
    }

    /// One scheduling pass: enqueue a check per tracked app. Returns the
    /// number enqueued.
    pub async fn run_once(&self) -> Result<usize> {
        let apps = self.apps.list().await.or_raise(|| ErrorKind::Store)?;
        let count = apps.len();
        for app in apps {
            self.queue
                .enqueue(CHECK_QUEUE, &CheckJob { app: app.id }, check_job_options())
                .await
                .or_raise(|| ErrorKind::Queue)?;
        }
        tracing::debug!(count, "scheduled update checks");
        Ok(count)
    }

    /// Spawn the interval loop. The first pass fires immediately; the task
    /// stops when the shutdown channel flips to `true`.
    pub fn start(self, mut shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if let Err(err) = self.run_once().await {
                            tracing::error!(error = ?err, "scheduling pass failed");
                        }
                    }
                    changed = shutdown.changed() => {
                        // A dropped sender means nobody can ever signal us;
                        // treat the closed channel as shutdown.
                        if changed.is_err() || *shutdown.borrow() {
                            break;
                        }
                    }
                }
            }
            tracing::debug!("check scheduler stopped");
        })
    }
}
