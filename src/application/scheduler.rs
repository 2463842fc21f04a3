use crate::domain::error::DomainError;
use crate::domain::ports::clock::Clock;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;

/// Work fired by the [`Scheduler`] on every tick.
#[async_trait]
pub trait Job: Send + Sync {
    fn name(&self) -> &str;

    async fn run(&self, fired_at: DateTime<Utc>) -> Result<(), DomainError>;
}

/// Single cooperative loop: sleep for the interval, run the job to
/// completion, repeat. Runs never overlap because the next sleep only starts
/// once the job has returned.
pub struct Scheduler {
    interval: Duration,
    clock: Arc<dyn Clock>,
    run_immediately: bool,
}

impl Scheduler {
    pub fn new(interval: Duration, clock: Arc<dyn Clock>) -> Result<Self, DomainError> {
        if interval.is_zero() {
            return Err(DomainError::InvalidInput(
                "Scheduler interval must be greater than zero".into(),
            ));
        }
        Ok(Self {
            interval,
            clock,
            run_immediately: false,
        })
    }

    /// Also run the job once before the first sleep.
    pub fn run_immediately(mut self, yes: bool) -> Self {
        self.run_immediately = yes;
        self
    }

    /// Loop until the hosting task is dropped.
    pub async fn start(&self, job: &dyn Job) {
        self.run(job, None).await;
    }

    /// Loop for at most `max_ticks` job invocations (forever when `None`).
    /// Returns the number of invocations made. Job errors are logged and do
    /// not stop the loop.
    pub async fn run(&self, job: &dyn Job, max_ticks: Option<u64>) -> u64 {
        let mut ticks = 0u64;
        tracing::info!(job = job.name(), interval = ?self.interval, "scheduler started");

        if self.run_immediately && max_ticks.map_or(true, |max| max > 0) {
            self.fire(job, ticks).await;
            ticks += 1;
        }

        while max_ticks.map_or(true, |max| ticks < max) {
            self.clock.sleep(self.interval).await;
            self.fire(job, ticks).await;
            ticks += 1;
        }

        tracing::info!(job = job.name(), ticks, "scheduler stopped");
        ticks
    }

    async fn fire(&self, job: &dyn Job, tick: u64) {
        let fired_at = self.clock.now();
        let started = std::time::Instant::now();
        match job.run(fired_at).await {
            Ok(()) => tracing::info!(
                job = job.name(),
                tick,
                elapsed_ms = started.elapsed().as_millis() as u64,
                "job finished"
            ),
            Err(e) => tracing::error!(job = job.name(), tick, error = %e, "job failed"),
        }
    }
}
