//! Data types crossing the scraper gateway boundary.
//!
//! These are plain data carriers: whatever the concrete gateway parses out of
//! the remote catalog's HTML ends up in one of these. The scraped variant
//! list is also persisted verbatim onto its App row (JSON column), so
//! [`ScrapedVariant`] derives serde both ways.

use serde::{Deserialize, Serialize};

/// One result row of a catalog search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub name: String,
    pub developer: String,
    /// Canonical URL of the app's catalog page. Feeding this into
    /// `Tracker::add_app` starts mirroring the app.
    pub source_url: String,
    pub icon_url: String,
    /// Free-form blurb the catalog shows under the result.
    pub info: String,
}

/// One page of catalog search results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPage {
    pub results: Vec<SearchResult>,
    pub has_next_page: bool,
}

/// A freshly scraped app page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPage {
    pub name: String,
    pub developer: String,
    /// Android package identifier (e.g. `org.example.app`), used to build
    /// deterministic artifact filenames.
    pub package_id: String,
    /// Ordered lines of release notes / description shown on the page.
    pub notes: Vec<String>,
    /// Every variant the page currently advertises, in page order.
    pub variants: Vec<ScrapedVariant>,
}

/// One variant entry as scraped from an app page.
///
/// `name` is the stable logical key a persisted Variant is matched on; the
/// URLs and selector fields may legitimately change between scrapes for the
/// same logical variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapedVariant {
    pub name: String,
    pub arch: String,
    pub android_version: String,
    pub density: String,
    /// Canonical release-list URL for this variant.
    pub url: String,
    /// Human-readable version label.
    pub version: String,
    /// Release-detail URL of the latest version the page advertises.
    pub version_url: String,
}

/// A scraped release-detail page: the concrete builds offered for one version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleasePage {
    pub releases: Vec<SubRelease>,
}

/// One downloadable build on a release-detail page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubRelease {
    /// Remote build identifier, stable per uploaded binary.
    pub build_id: String,
    pub arch: String,
    pub android_version: String,
    pub density: String,
    /// Declared size as shown on the page, e.g. `"1,048,576 bytes"`.
    pub size: String,
}

impl SubRelease {
    /// Whether this build matches a variant's selector triple exactly.
    pub fn matches(&self, arch: &str, android_version: &str, density: &str) -> bool {
        self.arch == arch && self.android_version == android_version && self.density == density
    }
}
