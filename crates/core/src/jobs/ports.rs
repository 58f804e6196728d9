//! Port interfaces for remote job execution
//!
//! These traits define the boundaries between the polling engine
//! and the HTTP implementations of each product's job endpoints.

use std::time::{Duration, Instant};

use pingintel_domain::{Job, JobInput, JobKind, JobOptions, JobSnapshot, Result};

/// Trait for a family of remote jobs sharing one start/status protocol
pub trait JobBackend: Send + Sync {
    /// Kind of job this backend starts
    fn kind(&self) -> JobKind;

    /// Submit the job; input has already been validated
    fn start(&self, input: &JobInput, options: &JobOptions) -> Result<Job>;

    /// Fetch the current status once
    fn fetch_status(&self, job_id: &str) -> Result<JobSnapshot>;
}

/// Time source used while waiting for a job
pub trait PollClock: Send + Sync {
    fn now(&self) -> Instant;

    fn sleep(&self, duration: Duration);
}

/// Wall clock backed by `std::thread::sleep`
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl PollClock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }
}
