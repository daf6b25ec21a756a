//! Background job scheduler.
//!
//! Initialises a [`JobScheduler`] at server startup and registers the
//! recurring price-refresh job.

use std::sync::Arc;

use sqlx::PgPool;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use crate::refresh;

/// Builds and starts the background job scheduler.
///
/// Returns the running [`JobScheduler`] handle, which must be kept alive
/// for the lifetime of the process — dropping it shuts down all jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised,
/// the job cannot be registered, or the scheduler fails to start.
pub async fn build_scheduler(
    pool: PgPool,
    config: Arc<scoopdb_core::AppConfig>,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    register_refresh_job(&scheduler, pool, config).await?;

    scheduler.start().await?;
    Ok(scheduler)
}

/// Registers the nightly price-refresh job (03:00 UTC by default,
/// `SCOOPDB_REFRESH_CRON` overrides).
async fn register_refresh_job(
    scheduler: &JobScheduler,
    pool: PgPool,
    config: Arc<scoopdb_core::AppConfig>,
) -> Result<(), JobSchedulerError> {
    let pool = Arc::new(pool);

    let refresh_cron = config.refresh_cron.clone();
    let job = Job::new_async(refresh_cron.as_str(), move |_uuid, _lock| {
        let pool = Arc::clone(&pool);
        let config = Arc::clone(&config);

        Box::pin(async move {
            tracing::info!("scheduler: starting nightly price refresh");
            run_refresh_job(&pool, &config).await;
            tracing::info!("scheduler: nightly price refresh complete");
        })
    })?;

    scheduler.add(job).await?;
    Ok(())
}

/// Drives one refresh pass; failures are logged, never fatal to the server.
async fn run_refresh_job(pool: &PgPool, config: &scoopdb_core::AppConfig) {
    let scraper = match refresh::build_scraper(config) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "scheduler: scraper unavailable, skipping run");
            return;
        }
    };

    match refresh::run_price_refresh(pool, &scraper).await {
        Ok(outcome) => {
            tracing::info!(
                updated = outcome.updated,
                total = outcome.total,
                "scheduler: price refresh finished"
            );
        }
        Err(e) => {
            tracing::error!(error = %e, "scheduler: price refresh failed to start");
        }
    }
}
