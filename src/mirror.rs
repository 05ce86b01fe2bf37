//! Wiring: stores, queues, workers and scheduler under one lifecycle.

use crate::config::Config;
use crate::error::{ErrorKind, Result};
use droidmirror_artifact::ArtifactStore;
use droidmirror_queue::{HandlerError, Queue, WorkerPool};
use droidmirror_scrape::ScraperGateway;
use droidmirror_store::{AppRepository, Database, VariantRepository};
use droidmirror_sync::{
    CHECK_QUEUE, CheckJob, CheckScheduler, CheckWorker, DOWNLOAD_QUEUE, DownloadJob, DownloadWorker, Tracker,
};
use exn::ResultExt;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// A running mirror: consumer pools for both queues plus the check
/// scheduler, sharing one shutdown flag.
///
/// The concrete [`ScraperGateway`] is injected; this crate never talks to
/// the remote catalog itself. Stop with [`stop`](Self::stop): in-flight jobs
/// finish, nothing new is claimed, and both databases are closed cleanly.
pub struct Mirror {
    db: Database,
    queue: Queue,
    tracker: Tracker,
    shutdown: watch::Sender<bool>,
    pools: Vec<WorkerPool>,
    scheduler: JoinHandle<()>,
}

impl Mirror {
    /// Open the stores, spawn the consumer pools and start the scheduler.
    pub async fn start(config: &Config, gateway: Arc<dyn ScraperGateway>) -> Result<Self> {
        let db = Database::connect(&config.store_db).await.or_raise(|| ErrorKind::Store)?;
        let queue = Queue::connect(&config.queue_db).await.or_raise(|| ErrorKind::Queue)?;
        let artifacts = ArtifactStore::new(&config.artifact_dir).or_raise(|| ErrorKind::Artifact)?;
        let apps = AppRepository::from(&db);
        let variants = VariantRepository::from(&db);

        let (shutdown, watcher) = watch::channel(false);

        let checker = Arc::new(CheckWorker::new(apps.clone(), variants.clone(), gateway.clone(), queue.clone()));
        let check_pool = queue.process(CHECK_QUEUE, config.check_concurrency, watcher.clone(), move |job, _ctx| {
            let checker = checker.clone();
            async move {
                let payload: CheckJob = job.payload().map_err(|err| HandlerError::new(err.to_string()))?;
                checker.run(&payload.app).await.map_err(|err| HandlerError::new(err.to_string()))?;
                Ok(())
            }
        });

        let downloader =
            Arc::new(DownloadWorker::new(apps.clone(), variants.clone(), gateway.clone(), artifacts));
        let download_pool =
            queue.process(DOWNLOAD_QUEUE, config.download_concurrency, watcher.clone(), move |job, ctx| {
                let downloader = downloader.clone();
                async move {
                    let payload: DownloadJob = job.payload().map_err(|err| HandlerError::new(err.to_string()))?;
                    downloader.run(&payload.variant, &ctx).await.map_err(|err| HandlerError::new(err.to_string()))?;
                    Ok(())
                }
            });

        let scheduler =
            CheckScheduler::new(apps.clone(), queue.clone(), config.check_interval()).start(watcher.clone());
        let tracker = Tracker::new(apps, variants, gateway, queue.clone());

        tracing::info!(
            store = %config.store_db.display(),
            queue = %config.queue_db.display(),
            artifacts = %config.artifact_dir.display(),
            "mirror started"
        );
        Ok(Self { db, queue, tracker, shutdown, pools: vec![check_pool, download_pool], scheduler })
    }

    /// The operator-facing tracking surface.
    pub fn tracker(&self) -> &Tracker {
        &self.tracker
    }

    /// The underlying job queue, for observability (pending counts,
    /// permanently failed jobs).
    pub fn queue(&self) -> &Queue {
        &self.queue
    }

    /// Graceful shutdown: flag, drain every pool, stop the scheduler, close
    /// both databases.
    pub async fn stop(self) {
        // Receivers outlive us inside the pools, so send cannot fail here.
        let _ = self.shutdown.send(true);
        for pool in self.pools {
            pool.drain().await;
        }
        if let Err(err) = self.scheduler.await {
            tracing::warn!(%err, "check scheduler task panicked");
        }
        self.queue.close().await;
        self.db.close().await;
        tracing::info!("mirror stopped");
    }
}
