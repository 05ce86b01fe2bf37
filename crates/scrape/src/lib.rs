//! Scraper gateway contract for the remote release catalog.
//!
//! The actual HTML fetching and parsing lives outside this repository; the
//! rest of the system only ever talks to the remote catalog through the
//! [`ScraperGateway`] trait defined here. This crate owns the data types that
//! cross that boundary (app pages, release pages, sub-releases) plus the
//! declared-size parsing used when streaming a release binary.
//!
//! Enable the `mock` feature in dev-dependencies to get [`MockScraper`],
//! a scriptable in-memory gateway for tests.

pub mod error;
mod gateway;
#[cfg(feature = "mock")]
mod mock;
mod models;
mod size;

pub use crate::gateway::{ByteStream, ScraperGateway};
#[cfg(feature = "mock")]
pub use crate::mock::MockScraper;
pub use crate::models::{AppPage, ReleasePage, ScrapedVariant, SearchPage, SearchResult, SubRelease};
pub use crate::size::parse_declared_size;
