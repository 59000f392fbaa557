use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::time::{Duration, interval};
use tracing::{debug, info, warn};

use crate::error::GatewayError;
use crate::metrics::HEALTHY_KEYS;

// Single provider API key

pub struct ApiKey {
    secret: String,
    healthy: AtomicBool, // usable right now?
}

impl ApiKey {
    pub fn new(secret: String) -> Self {
        Self {
            secret,
            healthy: AtomicBool::new(true),
        }
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }

    // Safe to log: only the last four characters
    pub fn label(&self) -> String {
        let tail: String = self
            .secret
            .chars()
            .rev()
            .take(4)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        format!("...{}", tail)
    }

    pub fn is_healthy(&self) -> bool {
        self.healthy.load(Ordering::Relaxed)
    }

    pub fn set_healthy(&self, healthy: bool) {
        self.healthy.store(healthy, Ordering::Relaxed);
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiKey")
            .field("key", &self.label())
            .field("healthy", &self.is_healthy())
            .finish()
    }
}

// Round-robin rotation over several API keys

#[derive(Debug)]
pub struct KeyPool {
    keys: Vec<Arc<ApiKey>>,
    current: AtomicUsize,
}

impl KeyPool {
    // Create from comma-separated keys "sk-or-v1-aaa, sk-or-v1-bbb"
    pub fn new(keys_str: &str) -> Result<Self, GatewayError> {
        let keys: Vec<Arc<ApiKey>> = keys_str
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|secret| Arc::new(ApiKey::new(secret.to_string())))
            .collect();

        if keys.is_empty() {
            return Err(GatewayError::Config(
                "at least one API key is required".to_string(),
            ));
        }

        info!("Key pool initialized with {} keys", keys.len());
        for (i, k) in keys.iter().enumerate() {
            info!("  [{}] {}", i + 1, k.label());
        }

        Ok(Self {
            keys,
            current: AtomicUsize::new(0),
        })
    }

    // Get next healthy key (round-robin)
    pub fn next_key(&self) -> Option<Arc<ApiKey>> {
        let len = self.keys.len();
        let start = self.current.fetch_add(1, Ordering::Relaxed) % len;

        for i in 0..len {
            let key = &self.keys[(start + i) % len];
            if key.is_healthy() {
                return Some(Arc::clone(key));
            }
        }
        None
    }

    pub fn all_keys(&self) -> &[Arc<ApiKey>] {
        &self.keys
    }

    pub fn healthy_count(&self) -> usize {
        self.keys.iter().filter(|k| k.is_healthy()).count()
    }
}

// Health check - probes every key against the provider's key endpoint

pub async fn health_checker(
    pool: Arc<KeyPool>,
    client: reqwest::Client,
    base_url: String,
    check_interval: Duration,
) {
    let mut interval = interval(check_interval);

    info!("Key health checker started (interval: {:?})", check_interval);

    loop {
        interval.tick().await;

        for key in pool.all_keys() {
            let was_healthy = key.is_healthy();

            let is_healthy = match client
                .get(format!("{}/key", base_url))
                .bearer_auth(key.secret())
                .timeout(Duration::from_secs(5))
                .send()
                .await
            {
                Ok(res) => res.status().is_success(),
                Err(_) => false,
            };
            key.set_healthy(is_healthy);

            if was_healthy != is_healthy {
                if is_healthy {
                    info!("API key {} is now healthy", key.label());
                } else {
                    warn!("API key {} is now unhealthy", key.label());
                }
            }
        }

        let healthy = pool.healthy_count();
        HEALTHY_KEYS.set(healthy as f64);
        if healthy == 0 {
            warn!("No healthy API keys - provider calls will fail");
        } else {
            debug!("{} of {} API keys healthy", healthy, pool.all_keys().len());
        }
    }
}
