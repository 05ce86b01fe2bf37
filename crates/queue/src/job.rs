//! Job rows and per-job context handed to handlers.

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use serde::de::DeserializeOwned;
use sqlx::SqlitePool;
use std::time::Duration;
use time::OffsetDateTime;

/// Options applied when enqueuing a job.
#[derive(Debug, Clone, Copy)]
pub struct JobOptions {
    /// Total delivery attempts before the job is parked as failed.
    pub attempts: u32,
    /// Base delay for jittered exponential backoff between attempts.
    pub backoff: Duration,
}

impl Default for JobOptions {
    fn default() -> Self {
        Self { attempts: 1, backoff: Duration::from_secs(5) }
    }
}

/// A claimed job, as handed to a handler.
///
/// `attempt` is 1-based and already counts the in-flight delivery.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Job {
    pub id: i64,
    pub queue: String,
    pub payload: String,
    pub attempt: i64,
    pub max_attempts: i64,
    pub backoff_ms: i64,
    pub progress: f64,
}

impl Job {
    /// Deserialize the JSON payload.
    pub fn payload<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.payload).or_raise(|| ErrorKind::InvalidPayload)
    }

    /// Whether this delivery is the job's last permitted attempt.
    pub fn is_final_attempt(&self) -> bool {
        self.attempt >= self.max_attempts
    }
}

/// A permanently failed job, as surfaced to the operator.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FailedJob {
    pub id: i64,
    pub queue: String,
    pub payload: String,
    pub attempt: i64,
    pub max_attempts: i64,
    pub error: Option<String>,
    pub updated_at: i64,
}

/// Handle a running job uses to report download progress.
///
/// Progress is advisory; failures to persist it are logged and swallowed so
/// that a flaky progress write can never fail an otherwise healthy job.
#[derive(Debug, Clone)]
pub struct JobContext {
    pool: SqlitePool,
    job_id: i64,
}

impl JobContext {
    pub(crate) fn new(pool: SqlitePool, job_id: i64) -> Self {
        Self { pool, job_id }
    }

    /// Persist a 0..=1 progress fraction for this job.
    pub async fn report_progress(&self, fraction: f64) {
        let fraction = fraction.clamp(0.0, 1.0);
        let result = sqlx::query(include_str!("../queries/progress.sql"))
            .bind(fraction)
            .bind(OffsetDateTime::now_utc().unix_timestamp())
            .bind(self.job_id)
            .execute(&self.pool)
            .await;
        if let Err(err) = result {
            tracing::warn!(job = self.job_id, %err, "failed to persist job progress");
        }
    }
}
