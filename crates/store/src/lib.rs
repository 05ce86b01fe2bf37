//! SQLite entity store for tracked apps and their variants.
//!
//! Two collections, exactly as the data model prescribes:
//! - **apps**: one row per tracked remote application, display metadata and
//!   the last-seen scraped variant list stored as JSON columns;
//! - **variants**: one row per operator-enabled variant, owned by an app row
//!   (`ON DELETE CASCADE`), `(app_id, name)` unique.
//!
//! Rows are keyed by the identity hashes from `droidmirror-model`, so ids are
//! stable across processes and never assigned by the database.

mod db;
pub mod error;
mod models;
mod repo;

pub use crate::db::Database;
pub use crate::repo::{AppRepository, VariantRepository};
