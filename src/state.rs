use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::debug;

use crate::cache::ResponseCache;
use crate::clock::Clock;
use crate::metrics::THROTTLED_USERS;
use crate::models::BatchedRequest;
use crate::provider::IdeaProvider;
use crate::rate_limit::RequestThrottle;
use crate::worker::batch_worker;

pub type Throttle = RequestThrottle<Arc<dyn Clock>>;

// app's shared state

pub struct AppState {
    pub throttle: Throttle,
    pub cache: Arc<ResponseCache>,
    pub batch_tx: mpsc::Sender<BatchedRequest>,
    pub trust_proxy_headers: bool, // key users by x-user-id / x-forwarded-for
}

#[derive(Clone, Debug)]
pub struct StateOptions {
    pub queue_depth: usize,
    pub max_in_flight: usize,
    pub cache_ttl: Duration,
    pub trust_proxy_headers: bool,
}

impl Default for StateOptions {
    fn default() -> Self {
        Self {
            queue_depth: 100,
            max_in_flight: 8,
            cache_ttl: Duration::from_secs(300),
            trust_proxy_headers: false,
        }
    }
}

impl AppState {
    // spawns the batch worker, so needs a tokio runtime
    pub fn start(
        throttle: Throttle,
        provider: Arc<dyn IdeaProvider>,
        options: StateOptions,
    ) -> Arc<Self> {
        let (batch_tx, batch_rx) = mpsc::channel::<BatchedRequest>(options.queue_depth.max(1));
        let cache = Arc::new(ResponseCache::new(options.cache_ttl));

        tokio::spawn(batch_worker(
            batch_rx,
            provider,
            Arc::clone(&cache),
            options.max_in_flight,
        ));

        Arc::new(Self {
            throttle,
            cache,
            batch_tx,
            trust_proxy_headers: options.trust_proxy_headers,
        })
    }
}

// Periodically drop idle throttle entries and expired cache entries
pub async fn sweeper(state: Arc<AppState>, every: Duration) {
    let mut interval = tokio::time::interval(every);

    loop {
        interval.tick().await;

        let users = state.throttle.purge_idle();
        let cached = state.cache.purge_expired();
        THROTTLED_USERS.set(state.throttle.tracked_users() as f64);

        if users > 0 || cached > 0 {
            debug!(
                "Sweep removed {} idle users and {} expired cache entries",
                users, cached
            );
        }
    }
}
