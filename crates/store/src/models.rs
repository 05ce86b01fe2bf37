//! Row structs and their conversions to/from domain types.

use crate::error::{Error, ErrorKind};
use droidmirror_model::{App, Variant};
use droidmirror_scrape::ScrapedVariant;
use exn::ResultExt;
use serde_json::{from_str as from_json, to_string as to_json};
use time::OffsetDateTime;

#[derive(sqlx::FromRow)]
pub(crate) struct AppRow {
    pub(crate) id: String,
    pub(crate) source_url: String,
    pub(crate) name: String,
    pub(crate) developer: String,
    pub(crate) package_id: String,
    pub(crate) notes: String,
    pub(crate) variants: String,
    #[sqlx(default)]
    pub(crate) last_check: Option<i64>,
    pub(crate) added_at: i64,
}

impl TryFrom<&App> for AppRow {
    type Error = Error;
    fn try_from(app: &App) -> Result<Self, Self::Error> {
        Ok(Self {
            id: app.id.clone(),
            source_url: app.source_url.clone(),
            name: app.name.clone(),
            developer: app.developer.clone(),
            package_id: app.package_id.clone(),
            notes: to_json(&app.notes).or_raise(|| ErrorKind::InvalidData("notes"))?,
            variants: to_json(&app.variants).or_raise(|| ErrorKind::InvalidData("variants"))?,
            last_check: app.last_check.map(|t| t.unix_timestamp()),
            added_at: app.added_at.unix_timestamp(),
        })
    }
}

impl TryFrom<AppRow> for App {
    type Error = Error;
    fn try_from(row: AppRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            source_url: row.source_url,
            name: row.name,
            developer: row.developer,
            package_id: row.package_id,
            notes: from_json::<Vec<String>>(&row.notes).or_raise(|| ErrorKind::InvalidData("notes"))?,
            variants: from_json::<Vec<ScrapedVariant>>(&row.variants)
                .or_raise(|| ErrorKind::InvalidData("variants"))?,
            last_check: row
                .last_check
                .map(|t| OffsetDateTime::from_unix_timestamp(t).or_raise(|| ErrorKind::InvalidData("last check")))
                .transpose()?,
            added_at: OffsetDateTime::from_unix_timestamp(row.added_at)
                .or_raise(|| ErrorKind::InvalidData("added at"))?,
        })
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct VariantRow {
    pub(crate) id: String,
    pub(crate) app_id: String,
    pub(crate) name: String,
    pub(crate) arch: String,
    pub(crate) android_version: String,
    pub(crate) density: String,
    pub(crate) url: String,
    pub(crate) version: String,
    pub(crate) version_url: String,
    #[sqlx(default)]
    pub(crate) cur_version_url: Option<String>,
}

impl From<&Variant> for VariantRow {
    fn from(variant: &Variant) -> Self {
        Self {
            id: variant.id.clone(),
            app_id: variant.app_id.clone(),
            name: variant.name.clone(),
            arch: variant.arch.clone(),
            android_version: variant.android_version.clone(),
            density: variant.density.clone(),
            url: variant.url.clone(),
            version: variant.version.clone(),
            version_url: variant.version_url.clone(),
            cur_version_url: variant.cur_version_url.clone(),
        }
    }
}

impl From<VariantRow> for Variant {
    fn from(row: VariantRow) -> Self {
        Self {
            id: row.id,
            app_id: row.app_id,
            name: row.name,
            arch: row.arch,
            android_version: row.android_version,
            density: row.density,
            url: row.url,
            version: row.version,
            version_url: row.version_url,
            cur_version_url: row.cur_version_url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_row_round_trips_json_columns() {
        let row = AppRow {
            id: "4cc2d16a7bd81e29".to_string(),
            source_url: "https://catalog.example/apk/dev/app/".to_string(),
            name: "Example".to_string(),
            developer: "Example Dev".to_string(),
            package_id: "org.example.app".to_string(),
            notes: r#"["line one","line two"]"#.to_string(),
            variants: r#"[{"name":"arm64","arch":"arm64-v8a","android_version":"5.0+","density":"nodpi","url":"https://catalog.example/v/","version":"1.0","version_url":"https://catalog.example/v/1.0/"}]"#.to_string(),
            last_check: Some(1_771_177_811),
            added_at: 1_771_000_000,
        };
        let app = App::try_from(row).unwrap();
        assert_eq!(app.notes.len(), 2);
        assert_eq!(app.variants[0].arch, "arm64-v8a");
        let back = AppRow::try_from(&app).unwrap();
        assert_eq!(back.last_check, Some(1_771_177_811));
    }

    #[test]
    fn test_app_row_rejects_bad_json() {
        let row = AppRow {
            id: "x".to_string(),
            source_url: String::new(),
            name: String::new(),
            developer: String::new(),
            package_id: String::new(),
            notes: "not json".to_string(),
            variants: "[]".to_string(),
            last_check: None,
            added_at: 0,
        };
        let err = App::try_from(row).unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidData("notes")));
    }
}
