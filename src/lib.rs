//! droidmirror: mirror third-party Android application releases into a
//! locally served repository.
//!
//! The mirror tracks apps on a remote release catalog, periodically
//! re-scrapes their pages, reconciles what it sees against the operator's
//! variant selection, and downloads new releases into a flat artifact
//! directory. All remote access goes through the [`ScraperGateway`] trait;
//! plug in a concrete scraper and call [`Mirror::start`].
//!
//! ```no_run
//! # use std::sync::Arc;
//! # use droidmirror::{Config, Mirror};
//! # async fn example(gateway: Arc<dyn droidmirror::ScraperGateway>) -> Result<(), Box<dyn std::error::Error>> {
//! droidmirror::init_tracing();
//! let config = Config::load(None)?;
//! let mirror = Mirror::start(&config, gateway).await?;
//! // ... serve mirror.tracker() from your frontend of choice ...
//! mirror.stop().await;
//! # Ok(())
//! # }
//! ```

mod config;
pub mod error;
mod mirror;
mod telemetry;

pub use crate::config::Config;
pub use crate::mirror::Mirror;
pub use crate::telemetry::init_tracing;

pub use droidmirror_artifact::ArtifactStore;
pub use droidmirror_model::{App, Variant, WorkingVariant};
pub use droidmirror_queue::FailedJob;
pub use droidmirror_scrape::{AppPage, ByteStream, ReleasePage, ScrapedVariant, ScraperGateway, SearchPage, SubRelease};
pub use droidmirror_sync::{AddOutcome, Tracker};
