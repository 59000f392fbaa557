use lazy_static::lazy_static;
use prometheus::{
    Counter, Encoder, Gauge, Histogram, TextEncoder, register_counter, register_gauge,
    register_histogram,
};

lazy_static! {
    pub static ref REQUEST_TOTAL: Counter =
        register_counter!("craft_requests_total", "Total number of idea requests").unwrap();
    pub static ref RATE_LIMITED: Counter =
        register_counter!("craft_rate_limited_total", "Requests rejected by the throttle").unwrap();
    pub static ref CACHE_HITS: Counter =
        register_counter!("craft_cache_hits_total", "Total cache hits").unwrap();
    pub static ref CACHE_MISSES: Counter =
        register_counter!("craft_cache_misses_total", "Total cache misses").unwrap();
    pub static ref PROVIDER_ERRORS: Counter =
        register_counter!("craft_provider_errors_total", "Failed provider calls").unwrap();
    pub static ref REQUEST_LATENCY: Histogram = register_histogram!(
        "craft_request_latency_seconds",
        "Request latency in seconds"
    )
    .unwrap();
    pub static ref CACHE_SIZE: Gauge =
        register_gauge!("craft_cache_size", "Current number of items in cache").unwrap();
    pub static ref HEALTHY_KEYS: Gauge =
        register_gauge!("craft_healthy_api_keys", "API keys currently marked healthy").unwrap();
    pub static ref THROTTLED_USERS: Gauge =
        register_gauge!("craft_throttle_users", "Users currently tracked by the throttle").unwrap();
}

// Render every registered metric in the prometheus text format
pub fn render() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}
