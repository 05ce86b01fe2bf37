//! The gateway trait every scraper implementation fulfils.

use crate::error::Result;
use crate::models::{AppPage, ReleasePage, SearchPage, SubRelease};
use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;

/// Chunked release binary, yielded as it arrives off the wire.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Vec<u8>>> + Send>>;

/// Unified interface to the remote release catalog.
///
/// Implementations own HTTP fetching, rate limiting and HTML parsing; none of
/// that leaks through this trait. Every method is a suspension point and may
/// fail transiently — callers decide whether to retry (the job queue does).
///
/// # Examples
///
/// ```no_run
/// use droidmirror_scrape::{ScraperGateway, error::Result};
///
/// async fn variant_count(gateway: &dyn ScraperGateway, url: &str) -> Result<usize> {
///     let page = gateway.app_page(url).await?;
///     Ok(page.variants.len())
/// }
/// ```
#[async_trait]
pub trait ScraperGateway: Send + Sync {
    /// Search the catalog. Pages are 1-based, matching the remote site.
    async fn search_apps(&self, query: &str, page: u32) -> Result<SearchPage>;

    /// Fetch the current app page for a canonical source URL.
    async fn app_page(&self, source_url: &str) -> Result<AppPage>;

    /// Fetch the release-detail page behind a variant's `version_url`.
    async fn release_page(&self, url: &str) -> Result<ReleasePage>;

    /// Open the binary download stream for one build.
    ///
    /// The returned stream yields raw chunks; the declared total comes from
    /// [`SubRelease::size`] via [`parse_declared_size`](crate::parse_declared_size).
    /// Content at a given build id is immutable at the source, so re-opening
    /// the same stream always yields the same bytes.
    async fn open_release_stream(&self, release: &SubRelease) -> Result<ByteStream>;
}
