//! Scriptable in-memory gateway for tests.
//!
//! Not gated behind `#[cfg(test)]` so that other crates can drive their own
//! tests with it (enable the `mock` cargo feature in dev-dependencies).

use crate::error::{ErrorKind, Result};
use crate::gateway::{ByteStream, ScraperGateway};
use crate::models::{AppPage, ReleasePage, SearchPage, SubRelease};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// What a scripted stream should yield when opened.
#[derive(Debug, Clone)]
enum StreamScript {
    /// Yield `total` bytes in `chunk` sized pieces, then end cleanly.
    Complete { total: u64, chunk: usize },
    /// Yield `deliver` bytes in `chunk` sized pieces, then fail.
    FailAfter { deliver: u64, chunk: usize },
}

#[derive(Debug, Default)]
struct State {
    searches: HashMap<(String, u32), SearchPage>,
    app_pages: HashMap<String, AppPage>,
    release_pages: HashMap<String, ReleasePage>,
    streams: HashMap<String, StreamScript>,
    unreachable: HashSet<String>,
    opened: HashMap<String, usize>,
}

/// In-memory [`ScraperGateway`] driven entirely by scripted pages.
///
/// Unknown URLs answer with [`ErrorKind::PageNotFound`]; URLs marked
/// unreachable answer with [`ErrorKind::Network`]. Every stream open is
/// counted so tests can assert the idempotency guard never touched the wire.
#[derive(Debug, Default)]
pub struct MockScraper {
    state: Mutex<State>,
}

impl MockScraper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script one page of search results for `(query, page)`.
    pub fn script_search(&self, query: &str, page: u32, results: SearchPage) {
        self.lock().searches.insert((query.to_string(), page), results);
    }

    /// Script the app page served for a canonical source URL.
    pub fn script_app_page(&self, source_url: &str, page: AppPage) {
        self.lock().app_pages.insert(source_url.to_string(), page);
    }

    /// Script the release-detail page served for a `version_url`.
    pub fn script_release_page(&self, url: &str, page: ReleasePage) {
        self.lock().release_pages.insert(url.to_string(), page);
    }

    /// Script a build's stream to deliver `total` bytes and end cleanly.
    pub fn script_stream(&self, build_id: &str, total: u64, chunk: usize) {
        self.lock().streams.insert(build_id.to_string(), StreamScript::Complete { total, chunk });
    }

    /// Script a build's stream to break after delivering `deliver` bytes.
    pub fn script_stream_failure(&self, build_id: &str, deliver: u64, chunk: usize) {
        self.lock().streams.insert(build_id.to_string(), StreamScript::FailAfter { deliver, chunk });
    }

    /// Make any fetch of `url` fail with a transient network error.
    pub fn script_unreachable(&self, url: &str) {
        self.lock().unreachable.insert(url.to_string());
    }

    /// How many times a build's stream has been opened.
    pub fn stream_opens(&self, build_id: &str) -> usize {
        self.lock().opened.get(build_id).copied().unwrap_or(0)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        // Mutex poisoning only happens if a test already panicked.
        self.state.lock().unwrap()
    }

    fn check_reachable(state: &State, url: &str) -> Result<()> {
        if state.unreachable.contains(url) {
            exn::bail!(ErrorKind::Network(format!("scripted outage: {url}")));
        }
        Ok(())
    }
}

fn chunks(total: u64, chunk: usize) -> Vec<Vec<u8>> {
    let mut remaining = total;
    let mut out = Vec::new();
    while remaining > 0 {
        let len = remaining.min(chunk as u64) as usize;
        out.push(vec![0xAB; len]);
        remaining -= len as u64;
    }
    out
}

#[async_trait]
impl ScraperGateway for MockScraper {
    async fn search_apps(&self, query: &str, page: u32) -> Result<SearchPage> {
        let state = self.lock();
        match state.searches.get(&(query.to_string(), page)) {
            Some(results) => Ok(results.clone()),
            None => Ok(SearchPage { results: Vec::new(), has_next_page: false }),
        }
    }

    async fn app_page(&self, source_url: &str) -> Result<AppPage> {
        let state = self.lock();
        Self::check_reachable(&state, source_url)?;
        match state.app_pages.get(source_url) {
            Some(page) => Ok(page.clone()),
            None => exn::bail!(ErrorKind::PageNotFound(source_url.to_string())),
        }
    }

    async fn release_page(&self, url: &str) -> Result<ReleasePage> {
        let state = self.lock();
        Self::check_reachable(&state, url)?;
        match state.release_pages.get(url) {
            Some(page) => Ok(page.clone()),
            None => exn::bail!(ErrorKind::PageNotFound(url.to_string())),
        }
    }

    async fn open_release_stream(&self, release: &SubRelease) -> Result<ByteStream> {
        let mut state = self.lock();
        *state.opened.entry(release.build_id.clone()).or_insert(0) += 1;
        let script = match state.streams.get(&release.build_id) {
            Some(script) => script.clone(),
            None => exn::bail!(ErrorKind::PageNotFound(release.build_id.clone())),
        };
        let items: Vec<Result<Vec<u8>>> = match script {
            StreamScript::Complete { total, chunk } => chunks(total, chunk).into_iter().map(Ok).collect(),
            StreamScript::FailAfter { deliver, chunk } => chunks(deliver, chunk)
                .into_iter()
                .map(Ok)
                .chain(std::iter::once(Err(exn::Exn::from(ErrorKind::Stream("scripted mid-stream failure".to_string())))))
                .collect(),
        };
        Ok(Box::pin(futures::stream::iter(items)))
    }
}
