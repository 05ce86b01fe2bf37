//! Artifact directory store.
//!
//! Downloaded release binaries land in one flat writable directory, served
//! statically by a separate component. Filenames are deterministic slugs
//! derived from stable release coordinates, so a repeat download of the same
//! release *overwrites* the previous file instead of accumulating duplicates
//! — that one property is what makes redelivered download jobs harmless.

pub mod error;
mod slug;
mod store;

pub use crate::slug::slug;
pub use crate::store::ArtifactStore;
