//! The durable queue itself: enqueue, claim, settle.

use crate::error::{ErrorKind, Result};
use crate::job::{FailedJob, Job, JobContext, JobOptions};
use exn::ResultExt;
use rand::Rng;
use serde::Serialize;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteSynchronous};
use std::path::Path;
use std::time::Duration;
use time::OffsetDateTime;

/// Embedded migrations that are run automatically on connect.
static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
const MAX_CONNECTIONS: u32 = 5;

/// How long a claimed job stays invisible before it is considered abandoned
/// and redelivered. Generous: a download can legitimately take a while.
const DEFAULT_LEASE: Duration = Duration::from_secs(15 * 60);

/// Cap on the backoff exponent so the delay can't overflow into centuries.
const MAX_BACKOFF_EXPONENT: u32 = 16;

/// Durable at-least-once job queues on SQLite.
///
/// One table holds every queue; the `queue` column discriminates. Claiming a
/// job bumps its attempt counter and pushes its visibility timestamp a lease
/// into the future — a consumer that dies mid-job simply lets the lease
/// expire and the job is redelivered. This is why handlers must tolerate
/// redelivery; the workers built on top of this queue all carry idempotency
/// guards for exactly that reason.
#[derive(Debug, Clone)]
pub struct Queue {
    pool: SqlitePool,
    lease: Duration,
}

impl Queue {
    async fn new(options: SqliteConnectOptions, max: Option<u32>) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(max.unwrap_or(MAX_CONNECTIONS))
            .connect_with(options)
            .await
            .or_raise(|| ErrorKind::Database)?;
        let queue = Self { pool, lease: DEFAULT_LEASE };
        queue.migrate().await?;
        Ok(queue)
    }

    /// Connect to the queue database at the given path.
    pub async fn connect(path: impl AsRef<Path>) -> Result<Self> {
        let options = Self::base_options().filename(path.as_ref()).create_if_missing(true);
        Self::new(options, None).await
    }

    /// Connect to an in-memory queue (useful for testing).
    pub async fn connect_in_memory() -> Result<Self> {
        let options = Self::base_options().filename(":memory:");
        Self::new(options, Some(1)).await
    }

    /// Override the visibility lease. Tests set this to zero to exercise
    /// redelivery without waiting.
    pub fn with_lease(mut self, lease: Duration) -> Self {
        self.lease = lease;
        self
    }

    fn base_options() -> SqliteConnectOptions {
        SqliteConnectOptions::new()
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_millis(1500))
    }

    async fn migrate(&self) -> Result<()> {
        MIGRATOR.run(&self.pool).await.or_raise(|| ErrorKind::Migration)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Enqueue a job, immediately visible to consumers.
    pub async fn enqueue<T: Serialize>(&self, queue: &str, payload: &T, options: JobOptions) -> Result<i64> {
        let payload = serde_json::to_string(payload).or_raise(|| ErrorKind::InvalidPayload)?;
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let id: (i64,) = sqlx::query_as(include_str!("../queries/enqueue.sql"))
            .bind(queue)
            .bind(payload)
            .bind(i64::from(options.attempts.max(1)))
            .bind(i64::try_from(options.backoff.as_millis()).unwrap_or(i64::MAX))
            .bind(now)
            .bind(now)
            .bind(now)
            .fetch_one(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        tracing::debug!(queue, job = id.0, "enqueued job");
        Ok(id.0)
    }

    /// Claim the next visible job, if any.
    ///
    /// Normally driven by [`process`](Self::process); public so tests and
    /// one-shot tools can drive deliveries by hand.
    pub async fn claim(&self, queue: &str) -> Result<Option<Job>> {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let lease_until = now + i64::try_from(self.lease.as_secs()).unwrap_or(i64::MAX);
        let job: Option<Job> = sqlx::query_as(include_str!("../queries/claim.sql"))
            .bind(lease_until)
            .bind(now)
            .bind(queue)
            .bind(now)
            .fetch_optional(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(job)
    }

    /// Acknowledge a job as successfully handled.
    pub async fn complete(&self, job: &Job) -> Result<()> {
        sqlx::query(include_str!("../queries/complete.sql"))
            .bind(OffsetDateTime::now_utc().unix_timestamp())
            .bind(job.id)
            .execute(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(())
    }

    /// Record a failed delivery: requeue with backoff, or park as failed
    /// once attempts are exhausted.
    pub async fn fail(&self, job: &Job, error: &str) -> Result<()> {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        if job.is_final_attempt() {
            tracing::warn!(queue = %job.queue, job = job.id, attempt = job.attempt, error, "job failed permanently");
            sqlx::query(include_str!("../queries/fail.sql"))
                .bind(error)
                .bind(now)
                .bind(job.id)
                .execute(&self.pool)
                .await
                .or_raise(|| ErrorKind::Database)?;
        } else {
            let delay = jittered_backoff(job.backoff_ms, job.attempt);
            // Visibility is tracked in whole seconds; round a nonzero delay up.
            let delay_secs = if delay == 0 { 0 } else { (delay / 1000).max(1) };
            tracing::debug!(queue = %job.queue, job = job.id, attempt = job.attempt, delay_ms = delay, error, "job failed, requeueing");
            sqlx::query(include_str!("../queries/retry.sql"))
                .bind(now + delay_secs)
                .bind(error)
                .bind(now)
                .bind(job.id)
                .execute(&self.pool)
                .await
                .or_raise(|| ErrorKind::Database)?;
        }
        Ok(())
    }

    /// Permanently failed jobs for a queue, oldest first. This is the whole
    /// operator-facing failure surface: payloads, attempt counts, last error.
    pub async fn failed_jobs(&self, queue: &str) -> Result<Vec<FailedJob>> {
        sqlx::query_as(include_str!("../queries/failed_jobs.sql"))
            .bind(queue)
            .fetch_all(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)
    }

    /// Number of jobs waiting (or leased) on a queue.
    pub async fn pending(&self, queue: &str) -> Result<u64> {
        let count: (i64,) = sqlx::query_as(include_str!("../queries/pending.sql"))
            .bind(queue)
            .fetch_one(&self.pool)
            .await
            .or_raise(|| ErrorKind::Database)?;
        Ok(u64::try_from(count.0).unwrap_or(0))
    }

    pub(crate) fn context(&self, job: &Job) -> JobContext {
        JobContext::new(self.pool.clone(), job.id)
    }
}

/// Full-jitter exponential backoff in milliseconds: uniform over
/// `0..=base * 2^(attempt-1)`. Randomization keeps a burst of failed
/// downloads from hammering the remote catalog in lockstep.
fn jittered_backoff(base_ms: i64, attempt: i64) -> i64 {
    let exponent = u32::try_from(attempt.saturating_sub(1)).unwrap_or(0).min(MAX_BACKOFF_EXPONENT);
    let ceiling = base_ms.saturating_mul(1_i64 << exponent);
    if ceiling <= 0 {
        return 0;
    }
    rand::rng().random_range(0..=ceiling)
}
