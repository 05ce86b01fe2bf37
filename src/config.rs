//! Configuration loading and validation.

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable prefix: `DROIDMIRROR_ARTIFACT_DIR` and friends.
const ENV_PREFIX: &str = "DROIDMIRROR_";

/// Runtime configuration for the mirror.
///
/// Layered lowest-precedence-first: built-in defaults, then an optional TOML
/// file, then `DROIDMIRROR_`-prefixed environment variables.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// SQLite file holding tracked apps and variants.
    pub store_db: PathBuf,
    /// SQLite file holding the job queues. Kept separate from the entity
    /// store so queue churn never contends with entity reads.
    pub queue_db: PathBuf,
    /// Absolute directory downloaded release binaries land in.
    pub artifact_dir: PathBuf,
    /// Seconds between scheduled update-check passes.
    pub check_interval_secs: u64,
    /// Concurrent update-check consumers.
    pub check_concurrency: usize,
    /// Concurrent download consumers.
    pub download_concurrency: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_db: PathBuf::from("/var/lib/droidmirror/store.db"),
            queue_db: PathBuf::from("/var/lib/droidmirror/queue.db"),
            artifact_dir: PathBuf::from("/var/lib/droidmirror/artifacts"),
            check_interval_secs: 6 * 60 * 60,
            check_concurrency: 2,
            download_concurrency: 2,
        }
    }
}

impl Config {
    /// Load configuration, optionally merging a TOML file over the defaults.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(file) = file {
            figment = figment.merge(Toml::file(file));
        }
        let config: Config =
            figment.merge(Env::prefixed(ENV_PREFIX)).extract().or_raise(|| ErrorKind::Config)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.check_interval_secs == 0 {
            exn::bail!(ErrorKind::Config);
        }
        if self.check_concurrency == 0 || self.download_concurrency == 0 {
            exn::bail!(ErrorKind::Config);
        }
        Ok(())
    }

    pub fn check_interval(&self) -> Duration {
        Duration::from_secs(self.check_interval_secs)
    }
}
