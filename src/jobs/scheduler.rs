//! Daily in-process job scheduling

use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, NaiveDateTime, NaiveTime, TimeDelta};
use tokio::task::JoinHandle;

use super::{JobConfig, JobRunner};
use crate::{Error, Result};

/// Parse an `HH:MM` run time
///
/// # Errors
///
/// Returns [`Error::Config`] if the value is not a valid 24-hour time
pub fn parse_at(at: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(at.trim(), "%H:%M")
        .map_err(|e| Error::Config(format!("invalid run time '{at}': {e}")))
}

/// Next occurrence of `at` strictly after `now`
#[must_use]
pub fn next_occurrence(now: NaiveDateTime, at: NaiveTime) -> NaiveDateTime {
    let today = now.date().and_time(at);
    if today > now {
        today
    } else {
        today + TimeDelta::days(1)
    }
}

/// Runs every job that declares an `at` time once a day
pub struct Scheduler {
    runner: Arc<JobRunner>,
    jobs: Vec<(JobConfig, NaiveTime)>,
}

impl Scheduler {
    /// Collect the scheduled jobs; jobs without `at` are left out
    ///
    /// # Errors
    ///
    /// Returns error if a job's `at` cannot be parsed
    pub fn new(runner: Arc<JobRunner>, jobs: &[JobConfig]) -> Result<Self> {
        let jobs = jobs
            .iter()
            .filter_map(|job| job.at.as_deref().map(|at| (job, at)))
            .map(|(job, at)| Ok((job.clone(), parse_at(at)?)))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { runner, jobs })
    }

    /// Number of scheduled jobs
    #[must_use]
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Spawn one background task per scheduled job
    #[must_use]
    pub fn spawn(self) -> Vec<JoinHandle<()>> {
        self.jobs
            .into_iter()
            .map(|(job, at)| {
                let runner = self.runner.clone();
                tokio::spawn(async move { job_loop(runner, job, at).await })
            })
            .collect()
    }
}

async fn job_loop(runner: Arc<JobRunner>, job: JobConfig, at: NaiveTime) {
    loop {
        let now = Local::now().naive_local();
        let next = next_occurrence(now, at);
        let wait = (next - now).to_std().unwrap_or(Duration::ZERO);
        tracing::info!(job = %job.name, next = %next, "job scheduled");

        tokio::time::sleep(wait).await;

        match runner.run(&job).await {
            Ok(report) => tracing::info!(
                job = %job.name,
                sent = report.sent,
                failed = report.failed,
                "scheduled run complete"
            ),
            Err(e) => tracing::error!(job = %job.name, error = %e, "scheduled run failed"),
        }

        // Keep a fast run from firing twice in the same minute
        tokio::time::sleep(Duration::from_secs(1)).await;
    }
}
