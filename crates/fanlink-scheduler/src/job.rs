// SPDX-License-Identifier: GPL-3.0-or-later
use anyhow::Result;
use chrono::{DateTime, Utc};

/// Execution context handed to a job on each run.
#[derive(Debug, Clone)]
pub struct JobContext {
    pub job_id: String,
    pub execution_time: DateTime<Utc>,
}

impl JobContext {
    pub fn new(job_id: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            execution_time: Utc::now(),
        }
    }
}

/// Job outcome. A failure marked `retry` consumes the job's retry
/// budget; one without is final for this run.
#[derive(Debug, PartialEq, Eq)]
pub enum JobResult {
    Success,
    Failure { error: String, retry: bool },
}

/// A background job the registry runs on an interval.
#[async_trait::async_trait]
pub trait Job: Send + Sync {
    /// Unique identifier for this job type
    fn job_type(&self) -> &'static str;

    /// Human-readable job name
    fn name(&self) -> String;

    /// Execute the job with given context
    async fn execute(&self, ctx: JobContext) -> Result<JobResult>;

    /// Retries allowed after a retriable failure, on top of the
    /// initial attempt.
    fn max_retries(&self) -> u32 {
        0
    }

    /// Backoff delay in seconds between retries
    fn retry_delay_seconds(&self) -> u64 {
        60
    }
}
