//! Durable, at-least-once job queues on SQLite.
//!
//! Two cooperating queues drive the mirror — periodic *check* jobs and the
//! *download* jobs they spawn — but nothing here knows that: this crate is a
//! generic payload-in, handler-out queue with bounded attempts, jittered
//! exponential backoff, visibility leases and per-job progress.
//!
//! Delivery is at-least-once by construction (a claim is a lease, not a
//! dequeue), so handlers are expected to be idempotent.

pub mod error;
mod job;
mod queue;
mod worker;

pub use crate::error::{HandlerError, HandlerResult};
pub use crate::job::{FailedJob, Job, JobContext, JobOptions};
pub use crate::queue::Queue;
pub use crate::worker::WorkerPool;
