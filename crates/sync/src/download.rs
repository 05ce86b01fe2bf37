//! The release-download worker.

use crate::error::{ErrorKind, Result};
use crate::progress::ProgressReporter;
use droidmirror_artifact::{ArtifactStore, slug};
use droidmirror_model::{App, Variant};
use droidmirror_scrape::{ScraperGateway, SubRelease, parse_declared_size};
use droidmirror_store::{AppRepository, VariantRepository};
use exn::{OptionExt, ResultExt};
use futures::TryStreamExt;
use std::sync::Arc;

/// How a download delivery ended.
#[derive(Debug)]
pub enum DownloadOutcome {
    /// The variant (or its app) was deleted after the job was enqueued.
    Vanished,
    /// The download pointer already matches the latest release. An earlier
    /// delivery of the same job got here first; nothing was fetched.
    UpToDate,
    /// The release binary is durably on disk and the pointer advanced.
    Stored { artifact: String, bytes: u64 },
}

/// Downloads the latest release of one enabled variant.
///
/// The worker re-reads the variant at the start of every delivery and bails
/// out if the pointer already matches, which is what makes redelivery (lease
/// expiry, crash, duplicate enqueue) harmless. The pointer only advances
/// after the artifact is flushed and fsynced, so a crash at any earlier
/// point leaves the variant still marked as needing a download and the next
/// delivery simply overwrites the partial file.
pub struct DownloadWorker {
    apps: AppRepository,
    variants: VariantRepository,
    gateway: Arc<dyn ScraperGateway>,
    artifacts: ArtifactStore,
}

impl DownloadWorker {
    pub fn new(
        apps: AppRepository,
        variants: VariantRepository,
        gateway: Arc<dyn ScraperGateway>,
        artifacts: ArtifactStore,
    ) -> Self {
        Self { apps, variants, gateway, artifacts }
    }

    pub async fn run(&self, variant_id: &str, progress: &dyn ProgressReporter) -> Result<DownloadOutcome> {
        let Some(mut variant) = self.variants.get(variant_id).await.or_raise(|| ErrorKind::Store)? else {
            tracing::warn!(variant = variant_id, "download for a variant that no longer exists; dropping");
            return Ok(DownloadOutcome::Vanished);
        };
        let Some(app) = self.apps.get(&variant.app_id).await.or_raise(|| ErrorKind::Store)? else {
            tracing::warn!(variant = variant_id, app = %variant.app_id, "download for an app that no longer exists; dropping");
            return Ok(DownloadOutcome::Vanished);
        };
        if !variant.needs_download() {
            tracing::debug!(variant = %variant.id, "already at the latest release; nothing to do");
            return Ok(DownloadOutcome::UpToDate);
        }

        let page = self.gateway.release_page(&variant.version_url).await.or_raise(|| ErrorKind::Scrape)?;
        let release = page
            .releases
            .iter()
            .find(|release| release.matches(&variant.arch, &variant.android_version, &variant.density))
            .ok_or_raise(|| ErrorKind::NoMatchingRelease {
                arch: variant.arch.clone(),
                android_version: variant.android_version.clone(),
                density: variant.density.clone(),
            })?;
        let declared = parse_declared_size(&release.size).or_raise(|| ErrorKind::Scrape)?;
        let name = artifact_name(&app, &variant, release);
        tracing::info!(app = %app.id, variant = %variant.id, artifact = %name, bytes = declared, "downloading release");

        let mut stream = self.gateway.open_release_stream(release).await.or_raise(|| ErrorKind::Scrape)?;
        let mut writer = self.artifacts.create(&name).await.or_raise(|| ErrorKind::Artifact)?;
        while let Some(chunk) = stream.try_next().await.or_raise(|| ErrorKind::Scrape)? {
            writer.write_chunk(&chunk).await.or_raise(|| ErrorKind::Artifact)?;
            if declared > 0 {
                progress.report(writer.written() as f64 / declared as f64).await;
            }
        }
        let bytes = writer.sync().await.or_raise(|| ErrorKind::Artifact)?;

        // Bytes are durable; only now may the pointer advance.
        variant.cur_version_url = Some(variant.version_url.clone());
        self.variants.save(&variant).await.or_raise(|| ErrorKind::Store)?;
        tracing::info!(variant = %variant.id, artifact = %name, bytes, "download finalized");
        Ok(DownloadOutcome::Stored { artifact: name, bytes })
    }
}

/// Deterministic artifact filename from stable release coordinates. Repeat
/// downloads of the same release land on the same name and overwrite.
fn artifact_name(app: &App, variant: &Variant, release: &SubRelease) -> String {
    let mut name = slug(&[
        &app.package_id,
        &variant.arch,
        &variant.android_version,
        &variant.density,
        &release.build_id,
        "----",
        &variant.version,
    ]);
    name.push_str(".apk");
    name
}
