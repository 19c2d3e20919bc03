//! Background job scheduler.
//!
//! Registers the recurring mention collection job at server startup.

use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use crate::api::AppState;
use crate::collection::run_tracked;

/// Builds and starts the scheduler. The returned handle must be kept alive
/// for the lifetime of the process.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the cron expression is invalid, the job
/// cannot be registered, or the scheduler fails to start.
pub async fn build_scheduler(
    state: AppState,
    cron: &str,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;
    register_collection_job(&scheduler, state, cron).await?;
    scheduler.start().await?;
    Ok(scheduler)
}

async fn register_collection_job(
    scheduler: &JobScheduler,
    state: AppState,
    cron: &str,
) -> Result<(), JobSchedulerError> {
    let job = Job::new_async(cron, move |_uuid, _lock| {
        let state = state.clone();

        Box::pin(async move {
            tracing::info!("scheduler: starting mention collection run");
            match run_tracked(&state, None, false).await {
                Some(Ok(summary)) => tracing::info!(
                    stored = summary.stored,
                    alerts = summary.alerts,
                    "scheduler: mention collection run complete"
                ),
                Some(Err(e)) => {
                    tracing::error!(error = %e, "scheduler: mention collection run failed");
                }
                None => {}
            }
        })
    })?;

    scheduler.add(job).await?;
    tracing::info!(cron = %cron, "scheduler: registered collection job");
    Ok(())
}
