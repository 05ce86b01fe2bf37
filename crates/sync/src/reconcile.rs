//! Matching scraped variants to persisted records.

use droidmirror_model::{Variant, WorkingVariant};
use droidmirror_scrape::ScrapedVariant;
use std::collections::HashMap;

/// Pair each scraped variant with its persisted counterpart, if any.
///
/// Matching is by `name` alone. Names are the only stable key the remote
/// page offers: selector fields (arch, android version, density) and every
/// URL can drift between scrapes, and matching on them would orphan a
/// record over a cosmetic remote change. The output preserves scrape order;
/// persisted records whose name no longer appears are left out (and left
/// alone in the store).
pub fn reconcile(scraped: &[ScrapedVariant], persisted: Vec<Variant>) -> Vec<WorkingVariant> {
    let mut by_name: HashMap<String, Variant> = persisted.into_iter().map(|v| (v.name.clone(), v)).collect();
    scraped
        .iter()
        .map(|entry| WorkingVariant::project(entry.clone(), by_name.remove(&entry.name)))
        .collect()
}
