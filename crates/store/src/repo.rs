//! Repositories for the two persisted collections.
//!
//! Apps are mutated wholesale (the check worker overwrites shared fields on
//! every cycle) so both repositories speak upsert rather than separate
//! insert/update paths — repeated application of the same state is a no-op,
//! which is what keeps racing check jobs safe without locks.

use crate::Database;
use crate::error::{ErrorKind, Result};
use crate::models::{AppRow, VariantRow};
use droidmirror_model::{App, Variant};
use sqlx::SqlitePool;

fn map_sqlx(err: sqlx::Error) -> ErrorKind {
    match &err {
        sqlx::Error::Database(db)
            if matches!(
                db.kind(),
                sqlx::error::ErrorKind::UniqueViolation | sqlx::error::ErrorKind::ForeignKeyViolation
            ) =>
        {
            ErrorKind::Constraint
        }
        _ => ErrorKind::Database,
    }
}

/// Repository for [`App`] aggregates.
#[derive(Debug, Clone)]
pub struct AppRepository {
    pool: SqlitePool,
}
impl From<&Database> for AppRepository {
    fn from(db: &Database) -> Self {
        Self { pool: db.pool().clone() }
    }
}
impl AppRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert or wholesale-overwrite an app.
    ///
    /// `added_at` is only written on first insert; every other shared field
    /// is replaced from the given aggregate.
    pub async fn save(&self, app: &App) -> Result<()> {
        let row = AppRow::try_from(app)?;
        sqlx::query(include_str!("../queries/upsert_app.sql"))
            .bind(row.id)
            .bind(row.source_url)
            .bind(row.name)
            .bind(row.developer)
            .bind(row.package_id)
            .bind(row.notes)
            .bind(row.variants)
            .bind(row.last_check)
            .bind(row.added_at)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;
        Ok(())
    }

    pub async fn get(&self, id: &str) -> Result<Option<App>> {
        let row: Option<AppRow> = sqlx::query_as(include_str!("../queries/get_app.sql"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx)?;
        row.map(App::try_from).transpose()
    }

    /// Look an app up by its canonical source URL (unique across apps).
    pub async fn get_by_source_url(&self, source_url: &str) -> Result<Option<App>> {
        let row: Option<AppRow> = sqlx::query_as(include_str!("../queries/get_app_by_source_url.sql"))
            .bind(source_url)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx)?;
        row.map(App::try_from).transpose()
    }

    /// Every tracked app, oldest first. The check scheduler walks this.
    pub async fn list(&self) -> Result<Vec<App>> {
        let rows: Vec<AppRow> = sqlx::query_as(include_str!("../queries/list_apps.sql"))
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx)?;
        rows.into_iter().map(App::try_from).collect()
    }
}

/// Repository for persisted [`Variant`] records.
#[derive(Debug, Clone)]
pub struct VariantRepository {
    pool: SqlitePool,
}
impl From<&Database> for VariantRepository {
    fn from(db: &Database) -> Self {
        Self { pool: db.pool().clone() }
    }
}
impl VariantRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert or overwrite a variant record.
    ///
    /// Enforced by the schema: `(app_id, name)` unique, `app_id` must
    /// reference an existing app. A violation surfaces as
    /// [`ErrorKind::Constraint`] — usually a racing writer.
    pub async fn save(&self, variant: &Variant) -> Result<()> {
        let row = VariantRow::from(variant);
        sqlx::query(include_str!("../queries/upsert_variant.sql"))
            .bind(row.id)
            .bind(row.app_id)
            .bind(row.name)
            .bind(row.arch)
            .bind(row.android_version)
            .bind(row.density)
            .bind(row.url)
            .bind(row.version)
            .bind(row.version_url)
            .bind(row.cur_version_url)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;
        Ok(())
    }

    pub async fn get(&self, id: &str) -> Result<Option<Variant>> {
        let row: Option<VariantRow> = sqlx::query_as(include_str!("../queries/get_variant.sql"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx)?;
        Ok(row.map(Variant::from))
    }

    /// All persisted variants for one app, i.e. the operator's current
    /// selection. Reconciliation matches against this set by name.
    pub async fn list_for_app(&self, app_id: &str) -> Result<Vec<Variant>> {
        let rows: Vec<VariantRow> = sqlx::query_as(include_str!("../queries/list_variants_for_app.sql"))
            .bind(app_id)
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx)?;
        Ok(rows.into_iter().map(Variant::from).collect())
    }

    /// Delete a variant record (the disable path). Already-downloaded
    /// artifacts are untouched.
    ///
    /// Returns `false` if no record existed — fine, the end state is the same.
    pub async fn delete(&self, id: &str) -> Result<bool> {
        let result = sqlx::query(include_str!("../queries/delete_variant.sql"))
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx)?;
        Ok(result.rows_affected() > 0)
    }
}
