use std::sync::Arc;
use tokio::sync::{Semaphore, mpsc};
use tracing::{debug, error, info};

use crate::cache::{ResponseCache, make_cache_key};
use crate::error::GatewayError;
use crate::metrics::{CACHE_HITS, CACHE_MISSES, PROVIDER_ERRORS};
use crate::models::{BatchedRequest, Job, JobOutput};
use crate::provider::IdeaProvider;

pub async fn batch_worker(
    mut rx: mpsc::Receiver<BatchedRequest>,
    provider: Arc<dyn IdeaProvider>,
    cache: Arc<ResponseCache>,
    max_in_flight: usize,
) {
    let permits = Arc::new(Semaphore::new(max_in_flight.max(1)));
    info!(
        "Batch worker started - up to {} provider calls in flight",
        max_in_flight.max(1)
    );

    // keep receiving jobs from the queue
    while let Some(batched_req) = rx.recv().await {
        let cache_key = make_cache_key(&batched_req.job);

        // check cache first
        if let Some(output) = cache.get(&cache_key) {
            CACHE_HITS.inc();
            debug!("[Worker] Cache HIT for {} job", batched_req.job.kind());
            let _ = batched_req.response_tx.send(Ok(output));
            continue;
        }
        CACHE_MISSES.inc();

        // only provider calls wait for a permit, the loop keeps serving cache hits
        let permits = Arc::clone(&permits);
        let provider = Arc::clone(&provider);
        let cache = Arc::clone(&cache);
        tokio::spawn(async move {
            let _permit = match permits.acquire_owned().await {
                Ok(p) => p,
                Err(_) => {
                    let _ = batched_req.response_tx.send(Err(GatewayError::WorkerDropped));
                    return;
                }
            };
            let result = run_job(provider.as_ref(), &batched_req.job).await;

            match &result {
                Ok(output) => cache.insert(cache_key, output.clone()),
                Err(e) => {
                    PROVIDER_ERRORS.inc();
                    error!("[Worker] {} job failed: {}", batched_req.job.kind(), e);
                }
            }
            // Send result back to handler
            let _ = batched_req.response_tx.send(result);
        });
    }

    info!("Batch worker stopped - queue closed");
}

async fn run_job(provider: &dyn IdeaProvider, job: &Job) -> Result<JobOutput, GatewayError> {
    match job {
        Job::Suggest { idea } => provider.suggest(idea).await.map(JobOutput::Suggestions),
        Job::Image { idea } => provider.generate_image(idea).await.map(JobOutput::ImageUrl),
    }
}
