//! The update-check worker.

use crate::error::{ErrorKind, Result};
use crate::jobs::{DOWNLOAD_QUEUE, DownloadJob, download_job_options};
use crate::reconcile::reconcile;
use droidmirror_queue::Queue;
use droidmirror_scrape::ScraperGateway;
use droidmirror_store::{AppRepository, VariantRepository};
use exn::ResultExt;
use std::sync::Arc;
use time::OffsetDateTime;

/// How a check delivery ended.
#[derive(Debug)]
pub enum CheckOutcome {
    /// The app was deleted after the job was enqueued; acknowledged as done.
    Vanished,
    /// The app was refreshed from the remote page.
    Refreshed {
        /// Download jobs enqueued for enabled variants with a new release.
        downloads_enqueued: usize,
    },
}

/// Refreshes one tracked app from its remote page.
///
/// A check re-scrapes the app page, reconciles the scraped variants against
/// the persisted selection, refreshes every enabled record, and enqueues a
/// download for each one whose latest release is newer than its download
/// pointer. The whole pass writes only wholesale overwrites and upserts, so
/// overlapping deliveries for the same app converge on the same state.
pub struct CheckWorker {
    apps: AppRepository,
    variants: VariantRepository,
    gateway: Arc<dyn ScraperGateway>,
    queue: Queue,
}

impl CheckWorker {
    pub fn new(
        apps: AppRepository,
        variants: VariantRepository,
        gateway: Arc<dyn ScraperGateway>,
        queue: Queue,
    ) -> Self {
        Self { apps, variants, gateway, queue }
    }

    pub async fn run(&self, app_id: &str) -> Result<CheckOutcome> {
        let Some(mut app) = self.apps.get(app_id).await.or_raise(|| ErrorKind::Store)? else {
            tracing::warn!(app = app_id, "check for an app that no longer exists; dropping");
            return Ok(CheckOutcome::Vanished);
        };

        let page = self.gateway.app_page(&app.source_url).await.or_raise(|| ErrorKind::Scrape)?;
        let persisted = self.variants.list_for_app(&app.id).await.or_raise(|| ErrorKind::Store)?;
        let working = reconcile(&page.variants, persisted);
        app.apply_page(&page);

        let mut downloads_enqueued = 0;
        for entry in &working {
            // Disabled variants are display-only; nothing to persist.
            let Some(record) = &entry.record else { continue };
            let mut record = record.clone();
            record.apply_working(entry);
            self.variants.save(&record).await.or_raise(|| ErrorKind::Store)?;
            if record.needs_download() {
                self.queue
                    .enqueue(DOWNLOAD_QUEUE, &DownloadJob { variant: record.id.clone() }, download_job_options())
                    .await
                    .or_raise(|| ErrorKind::Queue)?;
                downloads_enqueued += 1;
            }
        }

        app.last_check = Some(OffsetDateTime::now_utc());
        self.apps.save(&app).await.or_raise(|| ErrorKind::Store)?;
        tracing::info!(app = %app.id, name = %app.name, downloads = downloads_enqueued, "check complete");
        Ok(CheckOutcome::Refreshed { downloads_enqueued })
    }
}
