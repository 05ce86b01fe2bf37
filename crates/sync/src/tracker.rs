//! Operator-facing tracking surface: search, add, inspect, select.

use crate::error::{ErrorKind, Result};
use crate::jobs::{CHECK_QUEUE, CheckJob, check_job_options};
use crate::reconcile::reconcile;
use crate::selection::apply_selection;
use droidmirror_model::{App, WorkingVariant};
use droidmirror_queue::Queue;
use droidmirror_scrape::{ScraperGateway, SearchPage};
use droidmirror_store::{AppRepository, VariantRepository};
use exn::ResultExt;
use std::collections::HashSet;
use std::sync::Arc;

/// Result of asking to track an app.
pub enum AddOutcome {
    /// The app was not tracked before; a first check is already enqueued.
    Added(App),
    /// The source URL was already tracked; nothing changed.
    AlreadyTracked(App),
}

/// The operator's entry point for managing the tracked set.
pub struct Tracker {
    apps: AppRepository,
    variants: VariantRepository,
    gateway: Arc<dyn ScraperGateway>,
    queue: Queue,
}

impl Tracker {
    pub fn new(
        apps: AppRepository,
        variants: VariantRepository,
        gateway: Arc<dyn ScraperGateway>,
        queue: Queue,
    ) -> Self {
        Self { apps, variants, gateway, queue }
    }

    /// Search the remote catalog. Pass-through; nothing is persisted.
    pub async fn search(&self, query: &str, page: u32) -> Result<SearchPage> {
        self.gateway.search_apps(query, page).await.or_raise(|| ErrorKind::Scrape)
    }

    /// Start tracking the app behind a catalog URL.
    ///
    /// Adding is idempotent on `source_url`: a second add returns the
    /// existing aggregate untouched. A freshly added app gets an immediate
    /// check so its variants show up without waiting for the scheduler.
    pub async fn add_app(&self, source_url: &str) -> Result<AddOutcome> {
        if let Some(existing) = self.apps.get_by_source_url(source_url).await.or_raise(|| ErrorKind::Store)? {
            return Ok(AddOutcome::AlreadyTracked(existing));
        }
        let page = self.gateway.app_page(source_url).await.or_raise(|| ErrorKind::Scrape)?;
        let app = App::from_page(source_url, &page);
        self.apps.save(&app).await.or_raise(|| ErrorKind::Store)?;
        self.queue
            .enqueue(CHECK_QUEUE, &CheckJob { app: app.id.clone() }, check_job_options())
            .await
            .or_raise(|| ErrorKind::Queue)?;
        tracing::info!(app = %app.id, name = %app.name, "tracking new app");
        Ok(AddOutcome::Added(app))
    }

    /// An app plus its working variant list: the last-seen scrape paired
    /// with the current selection.
    pub async fn overview(&self, app_id: &str) -> Result<Option<(App, Vec<WorkingVariant>)>> {
        let Some(app) = self.apps.get(app_id).await.or_raise(|| ErrorKind::Store)? else {
            return Ok(None);
        };
        let persisted = self.variants.list_for_app(&app.id).await.or_raise(|| ErrorKind::Store)?;
        let working = reconcile(&app.variants, persisted);
        Ok(Some((app, working)))
    }

    /// Replace an app's variant selection with `desired` (working-variant
    /// ids), then enqueue a check so newly enabled variants get their first
    /// download promptly.
    pub async fn set_selection(&self, app_id: &str, desired: &HashSet<String>) -> Result<Vec<WorkingVariant>> {
        let Some(app) = self.apps.get(app_id).await.or_raise(|| ErrorKind::Store)? else {
            exn::bail!(ErrorKind::UnknownApp(app_id.to_string()));
        };
        let persisted = self.variants.list_for_app(&app.id).await.or_raise(|| ErrorKind::Store)?;
        let working = reconcile(&app.variants, persisted);
        let working = apply_selection(&self.variants, &app, working, desired).await?;
        self.queue
            .enqueue(CHECK_QUEUE, &CheckJob { app: app.id.clone() }, check_job_options())
            .await
            .or_raise(|| ErrorKind::Queue)?;
        Ok(working)
    }
}
