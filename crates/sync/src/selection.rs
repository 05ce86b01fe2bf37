//! Applying an operator's variant selection to the store.

use crate::error::{ErrorKind, Result};
use droidmirror_model::{App, WorkingVariant};
use droidmirror_store::VariantRepository;
use exn::ResultExt;
use std::collections::HashSet;

/// Diff the desired selection against the current one and persist the
/// difference.
///
/// `desired` holds working-variant ids. Three cases per working variant:
/// enabled but not desired deletes the record (artifacts stay on disk),
/// desired but not enabled materializes a fresh record with no download
/// pointer, anything else is untouched. Ids in `desired` that match no
/// working variant are ignored. Returns the working list with records
/// updated to reflect the new selection.
pub async fn apply_selection(
    variants: &VariantRepository,
    app: &App,
    working: Vec<WorkingVariant>,
    desired: &HashSet<String>,
) -> Result<Vec<WorkingVariant>> {
    let mut out = Vec::with_capacity(working.len());
    for mut entry in working {
        match (entry.enabled, desired.contains(&entry.id)) {
            (true, false) => {
                if let Some(record) = entry.record.take() {
                    variants.delete(&record.id).await.or_raise(|| ErrorKind::Store)?;
                    tracing::info!(app = %app.id, variant = %record.id, name = %record.name, "variant disabled");
                }
                entry.enabled = false;
            }
            (false, true) => {
                let record = entry.clone().into_record(&app.id);
                variants.save(&record).await.or_raise(|| ErrorKind::Store)?;
                tracing::info!(app = %app.id, variant = %record.id, name = %record.name, "variant enabled");
                entry.record = Some(record);
                entry.enabled = true;
            }
            _ => {}
        }
        out.push(entry);
    }
    Ok(out)
}
