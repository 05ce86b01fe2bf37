//! Job payloads and enqueue policies for the two queues.

use droidmirror_queue::JobOptions;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Queue of per-app update checks.
pub const CHECK_QUEUE: &str = "checks";
/// Queue of per-variant release downloads.
pub const DOWNLOAD_QUEUE: &str = "downloads";

/// Payload of a check job: the identity hash of the app to refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckJob {
    pub app: String,
}

/// Payload of a download job: the identity hash of the variant to fetch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadJob {
    pub variant: String,
}

/// Enqueue policy for check jobs: single attempt, no backoff. A missed check
/// is simply superseded by the next scheduled pass.
pub fn check_job_options() -> JobOptions {
    JobOptions::default()
}

/// Enqueue policy for download jobs: generous retries with jittered
/// exponential backoff, since transient catalog failures are routine.
pub fn download_job_options() -> JobOptions {
    JobOptions { attempts: 10, backoff: Duration::from_secs(10) }
}
