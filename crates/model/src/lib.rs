//! Domain types for the mirror: tracked apps, their variants, and the
//! ephemeral working set a reconciliation pass produces.
//!
//! The types here are deliberately persistence-agnostic; `droidmirror-store`
//! owns the row mapping. What this crate *does* own are the two contracts the
//! rest of the system leans on:
//!
//! - identity: ids are derived from canonical URLs ([`short_hash`]), so they
//!   exist before anything is persisted and are stable across processes;
//! - refresh: the named subset-update functions ([`App::apply_page`],
//!   [`Variant::apply_working`]) spell out exactly which fields a check
//!   overwrites and which it preserves.

mod app;
mod ids;
mod variant;

pub use crate::app::App;
pub use crate::ids::short_hash;
pub use crate::variant::{Variant, WorkingVariant};
