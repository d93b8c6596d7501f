use crate::cache::TranslationCache;
use anyhow::Result;
use std::sync::Arc;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{debug, info};

/// Job that evicts expired entries from the translation cache.
///
/// `schedule` is a 6-field cron expression (seconds first).
pub fn sweep_job(cache: Arc<TranslationCache>, schedule: &str) -> Result<Job> {
    let job = Job::new_async(schedule, move |_uuid, _l| {
        let cache = Arc::clone(&cache);

        Box::pin(async move {
            let evicted = cache.evict_stale();
            if evicted > 0 {
                info!(evicted, remaining = cache.len(), "Evicted stale translation cache entries");
            } else {
                debug!("Translation cache sweep found nothing to evict");
            }
        })
    })?;

    Ok(job)
}

/// Initialize and start the scheduler with the cache sweep job
pub async fn start_cache_sweeper(
    cache: Arc<TranslationCache>,
    schedule: &str,
) -> Result<JobScheduler> {
    let scheduler = JobScheduler::new().await?;

    info!("Scheduling translation cache sweep (cron: {})", schedule);
    scheduler.add(sweep_job(cache, schedule)?).await?;

    scheduler.start().await?;
    info!("✓ Cache sweeper started");

    Ok(scheduler)
}
