//! End-to-end flows through a running mirror backed by a scripted gateway.

use droidmirror::{AddOutcome, AppPage, Config, Mirror, ReleasePage, ScrapedVariant, ScraperGateway, SubRelease};
use droidmirror_scrape::MockScraper;
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

const SOURCE_URL: &str = "https://catalog.example/apk/dev/app/";

fn scraped(name: &str, version: &str) -> ScrapedVariant {
    ScrapedVariant {
        name: name.to_string(),
        arch: "arm64-v8a".to_string(),
        android_version: "5.0+".to_string(),
        density: "480dpi".to_string(),
        url: format!("https://catalog.example/app/{name}/"),
        version: version.to_string(),
        version_url: format!("https://catalog.example/app/{name}/{version}/"),
    }
}

fn page(variants: Vec<ScrapedVariant>) -> AppPage {
    AppPage {
        name: "Example".to_string(),
        developer: "Dev".to_string(),
        package_id: "org.example.app".to_string(),
        notes: vec!["release notes".to_string()],
        variants,
    }
}

fn release(build_id: &str) -> SubRelease {
    SubRelease {
        build_id: build_id.to_string(),
        arch: "arm64-v8a".to_string(),
        android_version: "5.0+".to_string(),
        density: "480dpi".to_string(),
        size: "2,048 bytes".to_string(),
    }
}

fn config(dir: &Path) -> Config {
    let mut config = Config::default();
    config.store_db = dir.join("store.db");
    config.queue_db = dir.join("queue.db");
    config.artifact_dir = dir.join("artifacts");
    // Long enough that only explicit enqueues drive these tests.
    config.check_interval_secs = 3600;
    config.check_concurrency = 1;
    config.download_concurrency = 1;
    config
}

/// Poll until `condition` holds or a generous deadline passes.
async fn wait_for<F, Fut>(what: &str, mut condition: F)
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    let deadline = Instant::now() + Duration::from_secs(10);
    while Instant::now() < deadline {
        if condition().await {
            return;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    panic!("timed out waiting for {what}");
}

async fn both_queues_idle(mirror: &Mirror) -> bool {
    mirror.queue().pending("checks").await.unwrap() == 0
        && mirror.queue().pending("downloads").await.unwrap() == 0
}

#[tokio::test(flavor = "multi_thread")]
async fn test_add_select_download_lifecycle() {
    let dir = tempfile::tempdir().unwrap();
    let mock = Arc::new(MockScraper::new());
    mock.script_app_page(SOURCE_URL, page(vec![scraped("arm64", "1.0")]));
    mock.script_release_page("https://catalog.example/app/arm64/1.0/", ReleasePage { releases: vec![release("b1")] });
    mock.script_stream("b1", 2048, 512);

    let mirror = Mirror::start(&config(dir.path()), mock.clone() as Arc<dyn ScraperGateway>).await.unwrap();

    // Track the app; the automatic first check drains with nothing enabled.
    let AddOutcome::Added(app) = mirror.tracker().add_app(SOURCE_URL).await.unwrap() else {
        panic!("expected a fresh add");
    };
    wait_for("first check to drain", || both_queues_idle(&mirror)).await;
    assert_eq!(mock.stream_opens("b1"), 0);

    // Enable the variant: check runs, spots the missing download, fetches it.
    let (_, working) = mirror.tracker().overview(&app.id).await.unwrap().unwrap();
    let desired: HashSet<String> = [working[0].id.clone()].into();
    mirror.tracker().set_selection(&app.id, &desired).await.unwrap();
    wait_for("download to finish", || async {
        let (_, working) = mirror.tracker().overview(&app.id).await.unwrap().unwrap();
        working[0].record.as_ref().is_some_and(|r| !r.needs_download())
    })
    .await;

    assert_eq!(mock.stream_opens("b1"), 1);
    let artifacts: Vec<_> = std::fs::read_dir(dir.path().join("artifacts"))
        .unwrap()
        .map(|entry| entry.unwrap())
        .collect();
    assert_eq!(artifacts.len(), 1);
    assert_eq!(artifacts[0].metadata().unwrap().len(), 2048);
    let name = artifacts[0].file_name().into_string().unwrap();
    assert!(name.starts_with("org.example.app_"));
    assert!(name.ends_with(".apk"));

    assert!(mirror.queue().failed_jobs("downloads").await.unwrap().is_empty());
    mirror.stop().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_duplicate_checks_converge_without_duplicate_downloads() {
    let dir = tempfile::tempdir().unwrap();
    let mock = Arc::new(MockScraper::new());
    mock.script_app_page(SOURCE_URL, page(vec![scraped("arm64", "1.0")]));
    mock.script_release_page("https://catalog.example/app/arm64/1.0/", ReleasePage { releases: vec![release("b1")] });
    mock.script_stream("b1", 2048, 512);

    let mirror = Mirror::start(&config(dir.path()), mock.clone() as Arc<dyn ScraperGateway>).await.unwrap();
    let AddOutcome::Added(app) = mirror.tracker().add_app(SOURCE_URL).await.unwrap() else {
        panic!("expected a fresh add");
    };
    wait_for("first check to drain", || both_queues_idle(&mirror)).await;

    let (_, working) = mirror.tracker().overview(&app.id).await.unwrap().unwrap();
    let desired: HashSet<String> = [working[0].id.clone()].into();
    // Two racing selection updates: two checks land on the queue.
    mirror.tracker().set_selection(&app.id, &desired).await.unwrap();
    mirror.tracker().set_selection(&app.id, &desired).await.unwrap();
    wait_for("all jobs to drain", || both_queues_idle(&mirror)).await;

    // Converged: one enabled record, pointer caught up. Any duplicate
    // download hit the up-to-date guard or overwrote the same artifact.
    let (_, working) = mirror.tracker().overview(&app.id).await.unwrap().unwrap();
    assert_eq!(working.len(), 1);
    let record = working[0].record.as_ref().unwrap();
    assert!(!record.needs_download());
    let artifacts = std::fs::read_dir(dir.path().join("artifacts")).unwrap().count();
    assert_eq!(artifacts, 1);
    assert!(mock.stream_opens("b1") >= 1);
    mirror.stop().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_disable_then_reenable_redownloads() {
    let dir = tempfile::tempdir().unwrap();
    let mock = Arc::new(MockScraper::new());
    mock.script_app_page(SOURCE_URL, page(vec![scraped("arm64", "1.0")]));
    mock.script_release_page("https://catalog.example/app/arm64/1.0/", ReleasePage { releases: vec![release("b1")] });
    mock.script_stream("b1", 2048, 512);

    let mirror = Mirror::start(&config(dir.path()), mock.clone() as Arc<dyn ScraperGateway>).await.unwrap();
    let AddOutcome::Added(app) = mirror.tracker().add_app(SOURCE_URL).await.unwrap() else {
        panic!("expected a fresh add");
    };
    wait_for("first check to drain", || both_queues_idle(&mirror)).await;

    let (_, working) = mirror.tracker().overview(&app.id).await.unwrap().unwrap();
    let desired: HashSet<String> = [working[0].id.clone()].into();
    mirror.tracker().set_selection(&app.id, &desired).await.unwrap();
    wait_for("first download", || async {
        let (_, working) = mirror.tracker().overview(&app.id).await.unwrap().unwrap();
        working[0].record.as_ref().is_some_and(|r| !r.needs_download())
    })
    .await;
    assert_eq!(mock.stream_opens("b1"), 1);

    // Disable: the record goes away, the artifact stays on disk.
    mirror.tracker().set_selection(&app.id, &HashSet::new()).await.unwrap();
    wait_for("disable check to drain", || both_queues_idle(&mirror)).await;
    let (_, working) = mirror.tracker().overview(&app.id).await.unwrap().unwrap();
    assert!(!working[0].enabled);
    assert_eq!(std::fs::read_dir(dir.path().join("artifacts")).unwrap().count(), 1);

    // Re-enable: a fresh record with no download pointer, so the release is
    // fetched again (and lands on the same deterministic filename).
    mirror.tracker().set_selection(&app.id, &desired).await.unwrap();
    wait_for("second download", || async {
        let (_, working) = mirror.tracker().overview(&app.id).await.unwrap().unwrap();
        working[0].record.as_ref().is_some_and(|r| !r.needs_download())
    })
    .await;
    assert_eq!(mock.stream_opens("b1"), 2);
    assert_eq!(std::fs::read_dir(dir.path().join("artifacts")).unwrap().count(), 1);
    mirror.stop().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn test_new_release_detected_on_next_check() {
    let dir = tempfile::tempdir().unwrap();
    let mock = Arc::new(MockScraper::new());
    mock.script_app_page(SOURCE_URL, page(vec![scraped("arm64", "1.0")]));
    mock.script_release_page("https://catalog.example/app/arm64/1.0/", ReleasePage { releases: vec![release("b1")] });
    mock.script_stream("b1", 2048, 512);

    let mirror = Mirror::start(&config(dir.path()), mock.clone() as Arc<dyn ScraperGateway>).await.unwrap();
    let AddOutcome::Added(app) = mirror.tracker().add_app(SOURCE_URL).await.unwrap() else {
        panic!("expected a fresh add");
    };
    wait_for("first check to drain", || both_queues_idle(&mirror)).await;
    let (_, working) = mirror.tracker().overview(&app.id).await.unwrap().unwrap();
    let desired: HashSet<String> = [working[0].id.clone()].into();
    mirror.tracker().set_selection(&app.id, &desired).await.unwrap();
    wait_for("1.0 download", || async {
        let (_, working) = mirror.tracker().overview(&app.id).await.unwrap().unwrap();
        working[0].record.as_ref().is_some_and(|r| !r.needs_download())
    })
    .await;

    // The remote publishes 2.0. Reapplying the same selection enqueues the
    // next check, standing in for the scheduler's periodic pass.
    mock.script_app_page(SOURCE_URL, page(vec![scraped("arm64", "2.0")]));
    mock.script_release_page("https://catalog.example/app/arm64/2.0/", ReleasePage { releases: vec![release("b2")] });
    mock.script_stream("b2", 2048, 512);
    mirror.tracker().set_selection(&app.id, &desired).await.unwrap();
    wait_for("2.0 download", || async {
        let (_, working) = mirror.tracker().overview(&app.id).await.unwrap().unwrap();
        working[0].record.as_ref().is_some_and(|r| r.version == "2.0" && !r.needs_download())
    })
    .await;

    assert_eq!(mock.stream_opens("b2"), 1);
    // Distinct versions, distinct artifacts: both releases are kept.
    assert_eq!(std::fs::read_dir(dir.path().join("artifacts")).unwrap().count(), 2);
    mirror.stop().await;
}
