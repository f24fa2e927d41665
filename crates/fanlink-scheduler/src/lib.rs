// SPDX-License-Identifier: GPL-3.0-or-later
pub mod job;
pub mod jobs;
pub mod registry;

use anyhow::Result;
use fanlink_config::AppConfig;
use fanlink_resolver::PresaveSweepService;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::Duration;
use tracing::info;

use jobs::AutoResolvePresavesJob;

pub struct Scheduler {
    config: AppConfig,
    sweep: Arc<PresaveSweepService>,
    registry: Arc<JobRegistry>,
}

impl Scheduler {
    pub fn new(config: AppConfig, sweep: Arc<PresaveSweepService>) -> Self {
        let registry = Arc::new(JobRegistry::new(config.scheduler.max_concurrent_jobs));
        Self {
            config,
            sweep,
            registry,
        }
    }

    /// Register all background jobs with their schedules.
    pub async fn register_jobs(&self) {
        info!(target: "scheduler", "registering background jobs");

        self.registry
            .register(
                "auto-resolve-presaves",
                AutoResolvePresavesJob::new(self.sweep.clone()),
                Duration::from_secs(self.config.scheduler.presave_sweep_interval_secs),
            )
            .await;

        info!(target: "scheduler", "all jobs registered");
    }

    /// Start the scheduler and return a handle to the background task.
    pub fn start(self) -> JoinHandle<Result<()>> {
        let registry = self.registry.clone();
        tokio::spawn(async move {
            registry.start().await;
            Ok(())
        })
    }
}

pub use job::{Job, JobContext, JobResult};
pub use registry::JobRegistry;
