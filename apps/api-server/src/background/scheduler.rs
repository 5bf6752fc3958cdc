//! Timer-driven sweep trigger using tokio-cron-scheduler.
//!
//! Registered once at process startup and kept alive for the process
//! lifetime. Ticks are not mutually exclusive: a sweep outlasting the
//! interval may overlap the next tick, which the engine's selection
//! predicate tolerates.

use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use crosspost_core::publish::PostPublisher;

/// Every minute, on the minute.
const SWEEP_SCHEDULE: &str = "0 * * * * *";

/// Scheduler configuration.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Enable the in-process timer. Deployments that rely on an external
    /// cron facility hitting /api/cron/publish-posts set this to false.
    pub enabled: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl SchedulerConfig {
    pub fn from_env() -> Self {
        Self {
            enabled: std::env::var("SCHEDULER_ENABLED")
                .map(|v| v != "false" && v != "0")
                .unwrap_or(true),
        }
    }
}

/// Cron job scheduler wrapper. Owns the recurring sweep job.
pub struct Scheduler {
    inner: JobScheduler,
}

impl Scheduler {
    /// Register the recurring sweep and start the scheduler. Returns `None`
    /// when disabled via configuration.
    pub async fn start(
        config: SchedulerConfig,
        publisher: PostPublisher,
    ) -> Result<Option<Self>, JobSchedulerError> {
        if !config.enabled {
            tracing::info!("Scheduler disabled; relying on the external sweep trigger");
            return Ok(None);
        }

        let inner = JobScheduler::new().await?;

        let job = Job::new_async(SWEEP_SCHEDULE, move |_uuid, _lock| {
            let publisher = publisher.clone();
            Box::pin(async move {
                match publisher.run_sweep().await {
                    Ok(result) if result.total > 0 => {
                        tracing::info!(
                            published = result.published,
                            failed = result.failed,
                            total = result.total,
                            "scheduled sweep finished"
                        );
                    }
                    Ok(_) => {}
                    // no caller to respond to: log and wait for the next tick
                    Err(err) => tracing::error!(%err, "scheduled sweep failed"),
                }
            })
        })?;

        let id = inner.add(job).await?;
        inner.start().await?;
        tracing::info!(schedule = %SWEEP_SCHEDULE, job_id = %id, "publish scheduler started");

        Ok(Some(Self { inner }))
    }

    /// Stop the scheduler.
    pub async fn shutdown(&mut self) -> Result<(), JobSchedulerError> {
        self.inner.shutdown().await?;
        tracing::info!("Scheduler stopped");
        Ok(())
    }
}
