// SPDX-License-Identifier: GPL-3.0-or-later
use crate::job::{Job, JobContext, JobResult};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{RwLock, Semaphore};
use tokio::time::{interval, sleep, Duration};
use tracing::{error, info, warn};

struct Scheduled {
    job: Arc<dyn Job>,
    every: Duration,
}

/// Runs registered jobs on fixed intervals. Concurrent executions are
/// capped by a semaphore; a job whose previous run is still in flight
/// queues behind it.
pub struct JobRegistry {
    jobs: RwLock<HashMap<String, Scheduled>>,
    max_concurrent: usize,
}

impl JobRegistry {
    pub fn new(max_concurrent: usize) -> Self {
        Self {
            jobs: RwLock::new(HashMap::new()),
            max_concurrent,
        }
    }

    /// Register a job to run every `every`.
    pub async fn register(
        &self,
        job_id: impl Into<String>,
        job: impl Job + 'static,
        every: Duration,
    ) {
        let job_id = job_id.into();
        let job = Arc::new(job) as Arc<dyn Job>;
        info!(
            target: "registry",
            %job_id,
            job_type = job.job_type(),
            name = %job.name(),
            ?every,
            "registering job"
        );
        self.jobs.write().await.insert(job_id, Scheduled { job, every });
    }

    /// Spawn one ticker task per registered job.
    pub async fn start(self: Arc<Self>) {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent));
        let jobs = self.jobs.read().await;

        for (job_id, scheduled) in jobs.iter() {
            let job_id = job_id.clone();
            let job = scheduled.job.clone();
            let every = scheduled.every;
            let semaphore = semaphore.clone();

            tokio::spawn(async move {
                let mut ticker = interval(every);
                loop {
                    ticker.tick().await;
                    let Ok(permit) = semaphore.clone().acquire_owned().await else {
                        break;
                    };
                    let job = job.clone();
                    let job_id = job_id.clone();
                    tokio::spawn(async move {
                        let _permit = permit;
                        run_with_retries(&job_id, job).await;
                    });
                }
            });
        }

        info!(
            target: "registry",
            jobs = jobs.len(),
            max_concurrent = self.max_concurrent,
            "job registry started"
        );
    }
}

/// One scheduled run of a job, including its retry budget. An `Err`
/// from `execute` counts as a retriable failure.
async fn run_with_retries(job_id: &str, job: Arc<dyn Job>) {
    let mut attempt = 0;
    loop {
        attempt += 1;
        let outcome = match job.execute(JobContext::new(job_id)).await {
            Ok(result) => result,
            Err(err) => JobResult::Failure {
                error: err.to_string(),
                retry: true,
            },
        };

        match outcome {
            JobResult::Success => {
                info!(
                    target: "registry",
                    %job_id,
                    job_type = job.job_type(),
                    attempt,
                    "job completed"
                );
                return;
            }
            JobResult::Failure { error, retry } => {
                error!(
                    target: "registry",
                    %job_id,
                    job_type = job.job_type(),
                    attempt,
                    %error,
                    retry,
                    "job failed"
                );
                if !retry || attempt > job.max_retries() {
                    return;
                }
                let delay = Duration::from_secs(job.retry_delay_seconds());
                warn!(target: "registry", %job_id, ?delay, "retrying job after delay");
                sleep(delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    struct FlakyJob {
        calls: Arc<AtomicU32>,
        failures_before_success: u32,
        retriable: bool,
    }

    #[async_trait::async_trait]
    impl Job for FlakyJob {
        fn job_type(&self) -> &'static str {
            "flaky"
        }

        fn name(&self) -> String {
            "Flaky".to_string()
        }

        async fn execute(&self, _ctx: JobContext) -> anyhow::Result<JobResult> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
            if call <= self.failures_before_success {
                Ok(JobResult::Failure {
                    error: "not yet".to_string(),
                    retry: self.retriable,
                })
            } else {
                Ok(JobResult::Success)
            }
        }

        fn max_retries(&self) -> u32 {
            2
        }

        fn retry_delay_seconds(&self) -> u64 {
            0
        }
    }

    fn flaky(calls: &Arc<AtomicU32>, failures: u32, retriable: bool) -> Arc<dyn Job> {
        Arc::new(FlakyJob {
            calls: calls.clone(),
            failures_before_success: failures,
            retriable,
        })
    }

    #[tokio::test]
    async fn retriable_failure_is_retried_until_success() {
        let calls = Arc::new(AtomicU32::new(0));
        run_with_retries("flaky-1", flaky(&calls, 1, true)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn retry_budget_bounds_total_attempts() {
        let calls = Arc::new(AtomicU32::new(0));
        run_with_retries("flaky-2", flaky(&calls, 10, true)).await;
        // Initial attempt plus max_retries.
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn non_retriable_failure_stops_immediately() {
        let calls = Arc::new(AtomicU32::new(0));
        run_with_retries("flaky-3", flaky(&calls, 10, false)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
