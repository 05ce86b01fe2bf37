//! Persisted variants and the per-pass working projection.

use crate::ids::short_hash;
use droidmirror_scrape::ScrapedVariant;

/// One selectable build of an app whose releases are tracked and downloaded.
///
/// A persisted Variant exists exactly while the operator has it enabled.
/// `(app_id, name)` is unique; `name` is the stable matching key during
/// reconciliation — selector fields and URLs may drift between scrapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant {
    /// Identity hash of the canonical release-list URL at enable time.
    pub id: String,
    /// Owning app; the store enforces the reference.
    pub app_id: String,
    pub name: String,
    pub arch: String,
    pub android_version: String,
    pub density: String,
    /// Canonical release-list URL.
    pub url: String,
    /// Human-readable version label.
    pub version: String,
    /// Latest release-detail URL seen by a check.
    pub version_url: String,
    /// Release-detail URL of the last *successfully downloaded* release.
    /// Trails `version_url` until a download job finalizes; `None` until the
    /// first successful download.
    pub cur_version_url: Option<String>,
}

impl Variant {
    /// Whether this variant has a release newer than the last download.
    pub fn needs_download(&self) -> bool {
        self.cur_version_url.as_deref() != Some(self.version_url.as_str())
    }

    /// Overwrite the shared matching/version fields from a working variant.
    ///
    /// Everything the scrape knows about is replaced; `id`, `app_id` and —
    /// critically — `cur_version_url` are preserved. The download pointer
    /// only ever advances in the download worker's finalize step.
    pub fn apply_working(&mut self, working: &WorkingVariant) {
        self.name = working.scraped.name.clone();
        self.arch = working.scraped.arch.clone();
        self.android_version = working.scraped.android_version.clone();
        self.density = working.scraped.density.clone();
        self.url = working.scraped.url.clone();
        self.version = working.scraped.version.clone();
        self.version_url = working.scraped.version_url.clone();
    }
}

/// Ephemeral projection pairing a freshly scraped variant with its persisted
/// counterpart, if any. Regenerated on every reconciliation pass and never
/// stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkingVariant {
    pub scraped: ScrapedVariant,
    /// Identity hash of the scraped release-list URL; exists whether or not
    /// the variant was ever persisted.
    pub id: String,
    /// True iff a persisted record with the same name exists.
    pub enabled: bool,
    /// The persisted counterpart, when enabled.
    pub record: Option<Variant>,
}

impl WorkingVariant {
    /// Project a scraped entry, attaching its persisted counterpart if one
    /// matches by name.
    pub fn project(scraped: ScrapedVariant, record: Option<Variant>) -> Self {
        Self {
            id: short_hash(&scraped.url),
            enabled: record.is_some(),
            record,
            scraped,
        }
    }

    /// Materialize a brand-new persisted record from the current scraped
    /// field values, linked to the given app. Used by the enable path.
    pub fn into_record(self, app_id: impl Into<String>) -> Variant {
        Variant {
            id: self.id,
            app_id: app_id.into(),
            name: self.scraped.name,
            arch: self.scraped.arch,
            android_version: self.scraped.android_version,
            density: self.scraped.density,
            url: self.scraped.url,
            version: self.scraped.version,
            version_url: self.scraped.version_url,
            cur_version_url: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scraped() -> ScrapedVariant {
        ScrapedVariant {
            name: "arm64-v8a, API 21+, 480dpi".to_string(),
            arch: "arm64-v8a".to_string(),
            android_version: "5.0+".to_string(),
            density: "480dpi".to_string(),
            url: "https://catalog.example/app/arm64/".to_string(),
            version: "2.0.0".to_string(),
            version_url: "https://catalog.example/app/arm64/2.0.0/".to_string(),
        }
    }

    #[test]
    fn test_project_without_record_is_disabled() {
        let working = WorkingVariant::project(scraped(), None);
        assert!(!working.enabled);
        assert_eq!(working.id, short_hash("https://catalog.example/app/arm64/"));
    }

    #[test]
    fn test_into_record_starts_with_no_download() {
        let record = WorkingVariant::project(scraped(), None).into_record("app1");
        assert_eq!(record.app_id, "app1");
        assert_eq!(record.cur_version_url, None);
        assert!(record.needs_download());
    }

    #[test]
    fn test_apply_working_preserves_download_pointer() {
        let mut record = WorkingVariant::project(scraped(), None).into_record("app1");
        record.cur_version_url = Some("https://catalog.example/app/arm64/1.9.0/".to_string());

        let mut fresh = scraped();
        fresh.version = "2.1.0".to_string();
        fresh.version_url = "https://catalog.example/app/arm64/2.1.0/".to_string();
        // Selector fields may drift; name is what matched.
        fresh.android_version = "6.0+".to_string();
        let working = WorkingVariant::project(fresh, Some(record.clone()));
        record.apply_working(&working);

        assert_eq!(record.version, "2.1.0");
        assert_eq!(record.android_version, "6.0+");
        assert_eq!(record.cur_version_url, Some("https://catalog.example/app/arm64/1.9.0/".to_string()));
        assert!(record.needs_download());
    }

    #[test]
    fn test_needs_download_false_once_pointer_caught_up() {
        let mut record = WorkingVariant::project(scraped(), None).into_record("app1");
        record.cur_version_url = Some(record.version_url.clone());
        assert!(!record.needs_download());
    }
}
