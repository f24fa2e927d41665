// SPDX-License-Identifier: GPL-3.0-or-later
use crate::job::{Job, JobContext, JobResult};
use anyhow::Result;
use fanlink_resolver::PresaveSweepService;
use std::sync::Arc;
use tracing::info;

/// Periodic pre-save sweep: re-resolves due records via the shared sweep
/// service. Failures within individual records are already absorbed by
/// the service; a `Failure` here means the sweep could not run at all
/// (typically a database error).
pub struct AutoResolvePresavesJob {
    sweep: Arc<PresaveSweepService>,
}

impl AutoResolvePresavesJob {
    pub fn new(sweep: Arc<PresaveSweepService>) -> Self {
        Self { sweep }
    }
}

#[async_trait::async_trait]
impl Job for AutoResolvePresavesJob {
    fn job_type(&self) -> &'static str {
        "auto_resolve_presaves"
    }

    fn name(&self) -> String {
        "Auto-Resolve Pre-Saves".to_string()
    }

    async fn execute(&self, ctx: JobContext) -> Result<JobResult> {
        info!(target: "jobs", job_id = %ctx.job_id, "executing pre-save sweep job");

        match self.sweep.run().await {
            Ok(summary) => {
                info!(
                    target: "jobs",
                    job_id = %ctx.job_id,
                    checked = summary.checked,
                    resolved = summary.resolved,
                    "pre-save sweep job completed"
                );
                Ok(JobResult::Success)
            }
            Err(error) => Ok(JobResult::Failure {
                error: error.to_string(),
                retry: true,
            }),
        }
    }

    fn max_retries(&self) -> u32 {
        2
    }

    fn retry_delay_seconds(&self) -> u64 {
        120
    }
}
