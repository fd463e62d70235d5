//! Background job scheduler.
//!
//! Runs the scheduled sync relay in-process on the configured cron.

use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use crate::relay::SyncRelay;

/// Builds and starts the background job scheduler.
///
/// Returns the running [`JobScheduler`] handle, which must be kept alive for
/// the lifetime of the process. Dropping it shuts down all scheduled jobs.
/// With `cron` set to `None` no job is registered.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised,
/// the cron expression is invalid, or the scheduler fails to start.
pub async fn build_scheduler(
    relay: SyncRelay,
    cron: Option<&str>,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    match cron {
        Some(cron) => register_sync_relay_job(&scheduler, relay, cron).await?,
        None => tracing::info!("scheduler: scheduled sync disabled"),
    }

    scheduler.start().await?;
    Ok(scheduler)
}

async fn register_sync_relay_job(
    scheduler: &JobScheduler,
    relay: SyncRelay,
    cron: &str,
) -> Result<(), JobSchedulerError> {
    let job = Job::new_async(cron, move |_uuid, _lock| {
        let relay = relay.clone();

        Box::pin(async move {
            tracing::info!("scheduler: starting scheduled sync");
            match relay.trigger().await {
                Ok(_) => tracing::info!("scheduler: scheduled sync complete"),
                Err(e) => tracing::error!(error = %e, "scheduler: scheduled sync failed"),
            }
        })
    })?;

    scheduler.add(job).await?;
    tracing::info!(cron, "scheduler: registered sync relay job");
    Ok(())
}
