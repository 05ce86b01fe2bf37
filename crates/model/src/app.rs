//! The tracked-app aggregate.

use crate::ids::short_hash;
use droidmirror_scrape::{AppPage, ScrapedVariant};
use time::OffsetDateTime;

/// A tracked remote application and its mirrored metadata.
///
/// Created when a not-yet-tracked remote app is added, overwritten wholesale
/// by every check cycle, never deleted automatically. The `variants` field is
/// the *last-seen scraped list* (what the remote page advertised), not the
/// operator's selection — the selection lives in persisted [`Variant`]
/// records (see [`crate::Variant`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct App {
    /// Identity hash of `source_url`.
    pub id: String,
    /// Canonical catalog page URL; unique across apps.
    pub source_url: String,
    pub name: String,
    pub developer: String,
    /// Android package identifier, used in artifact filenames.
    pub package_id: String,
    /// Ordered description/release-note lines from the catalog page.
    pub notes: Vec<String>,
    /// Variant list as of the last scrape, in page order.
    pub variants: Vec<ScrapedVariant>,
    /// When the last successful check completed.
    pub last_check: Option<OffsetDateTime>,
    pub added_at: OffsetDateTime,
}

impl App {
    /// Build a new aggregate from a freshly scraped page.
    pub fn from_page(source_url: impl Into<String>, page: &AppPage) -> Self {
        let source_url = source_url.into();
        Self {
            id: short_hash(&source_url),
            source_url,
            name: page.name.clone(),
            developer: page.developer.clone(),
            package_id: page.package_id.clone(),
            notes: page.notes.clone(),
            variants: page.variants.clone(),
            last_check: None,
            added_at: OffsetDateTime::now_utc(),
        }
    }

    /// Overwrite the shared display fields from a fresh scrape.
    ///
    /// This is the whole "what does a check refresh" contract for apps:
    /// name, developer, package id, notes and the last-seen variant list are
    /// replaced wholesale; identity (`id`, `source_url`), `last_check` and
    /// `added_at` are preserved. Wholesale replacement is what makes
    /// overlapping checks for the same app idempotent.
    pub fn apply_page(&mut self, page: &AppPage) {
        self.name = page.name.clone();
        self.developer = page.developer.clone();
        self.package_id = page.package_id.clone();
        self.notes = page.notes.clone();
        self.variants = page.variants.clone();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scraped(name: &str) -> ScrapedVariant {
        ScrapedVariant {
            name: name.to_string(),
            arch: "arm64-v8a".to_string(),
            android_version: "5.0+".to_string(),
            density: "nodpi".to_string(),
            url: format!("https://catalog.example/{name}/"),
            version: "1.2.3".to_string(),
            version_url: format!("https://catalog.example/{name}/1.2.3/"),
        }
    }

    fn page() -> AppPage {
        AppPage {
            name: "Example".to_string(),
            developer: "Example Dev".to_string(),
            package_id: "org.example.app".to_string(),
            notes: vec!["first line".to_string(), "second line".to_string()],
            variants: vec![scraped("arm64")],
        }
    }

    #[test]
    fn test_from_page_derives_id_from_source_url() {
        let app = App::from_page("https://catalog.example/apk/dev/app/", &page());
        assert_eq!(app.id, short_hash("https://catalog.example/apk/dev/app/"));
        assert!(app.last_check.is_none());
    }

    #[test]
    fn test_apply_page_overwrites_display_fields_only() {
        let mut app = App::from_page("https://catalog.example/apk/dev/app/", &page());
        let checked_at = OffsetDateTime::now_utc();
        app.last_check = Some(checked_at);

        let mut refresh = page();
        refresh.name = "Renamed".to_string();
        refresh.notes = vec!["replaced".to_string()];
        refresh.variants = vec![scraped("arm64"), scraped("x86_64")];
        app.apply_page(&refresh);

        assert_eq!(app.name, "Renamed");
        assert_eq!(app.notes, vec!["replaced".to_string()]);
        assert_eq!(app.variants.len(), 2);
        // Identity and bookkeeping survive a refresh.
        assert_eq!(app.id, short_hash("https://catalog.example/apk/dev/app/"));
        assert_eq!(app.source_url, "https://catalog.example/apk/dev/app/");
        assert_eq!(app.last_check, Some(checked_at));
    }

    #[test]
    fn test_apply_page_twice_is_idempotent() {
        let mut once = App::from_page("https://catalog.example/apk/dev/app/", &page());
        let mut twice = once.clone();
        let refresh = page();
        once.apply_page(&refresh);
        twice.apply_page(&refresh);
        twice.apply_page(&refresh);
        assert_eq!(once, twice);
    }
}
