//! Consumer pools: pull jobs off a queue and run a handler per job.

use crate::error::HandlerResult;
use crate::job::{Job, JobContext};
use crate::queue::Queue;
use std::future::Future;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinSet;

/// How often an idle consumer re-polls its queue.
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// A pool of consumer tasks processing one queue.
///
/// Consumers observe the shutdown flag only *between* jobs, so draining the
/// pool lets every in-flight job run to completion — important for downloads,
/// where interrupting a stream would leave truncated artifacts around.
#[derive(Debug)]
pub struct WorkerPool {
    tasks: JoinSet<()>,
}

impl WorkerPool {
    /// Wait for every consumer to finish its current job and exit.
    pub async fn drain(mut self) {
        while let Some(result) = self.tasks.join_next().await {
            if let Err(err) = result {
                tracing::warn!(%err, "queue consumer task panicked");
            }
        }
    }
}

impl Queue {
    /// Spawn `concurrency` consumers on `queue`, each running `handler` for
    /// every claimed job. One job occupies one task: slow I/O on one job
    /// never blocks the others.
    ///
    /// Handlers returning `Ok` acknowledge the job; errors feed the queue's
    /// retry/backoff machinery. Flip the shutdown flag and
    /// [`drain`](WorkerPool::drain) the returned pool to stop.
    pub fn process<F, Fut>(&self, queue: &str, concurrency: usize, shutdown: watch::Receiver<bool>, handler: F) -> WorkerPool
    where
        F: Fn(Job, JobContext) -> Fut + Clone + Send + Sync + 'static,
        Fut: Future<Output = HandlerResult> + Send + 'static,
    {
        let mut tasks = JoinSet::new();
        for consumer in 0..concurrency.max(1) {
            let queue_handle = self.clone();
            let queue_name = queue.to_string();
            let handler = handler.clone();
            let shutdown = shutdown.clone();
            tasks.spawn(async move {
                consume(queue_handle, queue_name, consumer, handler, shutdown).await;
            });
        }
        WorkerPool { tasks }
    }
}

async fn consume<F, Fut>(queue: Queue, name: String, consumer: usize, handler: F, mut shutdown: watch::Receiver<bool>)
where
    F: Fn(Job, JobContext) -> Fut + Send + Sync,
    Fut: Future<Output = HandlerResult> + Send,
{
    loop {
        if *shutdown.borrow() {
            break;
        }
        let job = match queue.claim(&name).await {
            Ok(Some(job)) => job,
            Ok(None) => {
                // Idle: sleep, but wake immediately on shutdown. A dropped
                // sender means nobody can ever signal us; treat the closed
                // channel as shutdown instead of spinning on the error.
                tokio::select! {
                    _ = tokio::time::sleep(POLL_INTERVAL) => {}
                    changed = shutdown.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                }
                continue;
            }
            Err(err) => {
                tracing::warn!(queue = %name, consumer, %err, "failed to claim job");
                tokio::time::sleep(POLL_INTERVAL).await;
                continue;
            }
        };

        let context = queue.context(&job);
        let settle = match handler(job.clone(), context).await {
            Ok(()) => queue.complete(&job).await,
            Err(err) => queue.fail(&job, &err.to_string()).await,
        };
        if let Err(err) = settle {
            // The job stays leased and will redeliver; at-least-once holds.
            tracing::warn!(queue = %name, job = job.id, %err, "failed to settle job");
        }
    }
    tracing::debug!(queue = %name, consumer, "queue consumer stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HandlerError;
    use crate::job::JobOptions;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_pool_processes_jobs_and_drains() {
        let queue = Queue::connect_in_memory().await.unwrap();
        for n in 0..5 {
            queue.enqueue("checks", &n, JobOptions::default()).await.unwrap();
        }

        let handled = Arc::new(AtomicUsize::new(0));
        let (stop, stop_rx) = watch::channel(false);
        let counter = handled.clone();
        let pool = queue.process("checks", 2, stop_rx, move |_job, _ctx| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        });

        while queue.pending("checks").await.unwrap() > 0 {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        stop.send(true).unwrap();
        pool.drain().await;
        assert_eq!(handled.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn test_dropped_shutdown_sender_stops_consumers() {
        let queue = Queue::connect_in_memory().await.unwrap();
        let (stop, stop_rx) = watch::channel(false);
        let pool = queue.process("checks", 2, stop_rx, |_job, _ctx| async { Ok(()) });

        // Losing the sender without ever flagging shutdown must still wind
        // the consumers down instead of leaving them polling forever.
        drop(stop);
        tokio::time::timeout(Duration::from_secs(1), pool.drain()).await.unwrap();
    }

    #[tokio::test]
    async fn test_handler_error_exhausts_to_failed() {
        let queue = Queue::connect_in_memory().await.unwrap();
        queue
            .enqueue(
                "downloads",
                &"v1",
                JobOptions { attempts: 2, backoff: Duration::ZERO },
            )
            .await
            .unwrap();

        let (stop, stop_rx) = watch::channel(false);
        let pool = queue.process("downloads", 1, stop_rx, move |_job, _ctx| async move {
            Err(HandlerError::new("scripted failure"))
        });

        while queue.failed_jobs("downloads").await.unwrap().is_empty() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        stop.send(true).unwrap();
        pool.drain().await;

        let failed = queue.failed_jobs("downloads").await.unwrap();
        assert_eq!(failed[0].attempt, 2);
        assert_eq!(failed[0].error.as_deref(), Some("scripted failure"));
    }
}
