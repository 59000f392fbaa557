use clap::Parser;
use std::time::Duration;

use crate::provider::ProviderSettings;
use crate::state::StateOptions;

// CLI argument structure
#[derive(Parser, Debug, Clone)]
#[command(name = "craft-copilot-gateway")]
#[command(about = "Idea suggestion and concept art gateway with per-user rate limiting")]
pub struct Args {
    // Port to run the server on
    #[arg(short, long, default_value_t = 8000)]
    pub port: u16,

    // Address to bind
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    // OpenAI-compatible provider base url
    #[arg(long, default_value = "https://openrouter.ai/api/v1")]
    pub provider_url: String,

    // Provider API keys (comma-separated), rotated round-robin
    #[arg(long, env = "OPENROUTER_API_KEYS", hide_env_values = true)]
    pub api_keys: String,

    #[arg(long, default_value = "anthropic/claude-instant-v1")]
    pub chat_model: String,

    #[arg(long, default_value = "stabilityai/stable-diffusion-xl-base-1.0")]
    pub image_model: String,

    // Sent as HTTP-Referer to the provider
    #[arg(long, default_value = "http://localhost:8000")]
    pub referer: String,

    // Sent as X-Title to the provider
    #[arg(long, default_value = "Craft Innovation Hub")]
    pub app_title: String,

    // Max admitted requests per user per window
    #[arg(long, default_value_t = 50, value_parser = clap::value_parser!(u32).range(1..))]
    pub rate_limit: u32,

    // Rate limit window in seconds
    #[arg(long, default_value_t = 3600, value_parser = clap::value_parser!(u64).range(1..))]
    pub rate_window: u64,

    // Cache TTL in seconds (0 disables the cache)
    #[arg(short, long, default_value_t = 300)]
    pub cache_ttl: u64,

    // Key health check interval in seconds
    #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u64).range(1..))]
    pub health_interval: u64,

    // Idle throttle / expired cache sweep interval in seconds
    #[arg(long, default_value_t = 600, value_parser = clap::value_parser!(u64).range(1..))]
    pub sweep_interval: u64,

    // Concurrent provider calls
    #[arg(long, default_value_t = 8)]
    pub max_in_flight: usize,

    // Pending job queue capacity
    #[arg(long, default_value_t = 100)]
    pub queue_depth: usize,

    // Key users by x-user-id / x-forwarded-for (only behind a proxy that sets them)
    #[arg(long, default_value_t = false)]
    pub trust_proxy_headers: bool,
}

impl Args {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn rate_window(&self) -> Duration {
        Duration::from_secs(self.rate_window)
    }

    pub fn provider_settings(&self) -> ProviderSettings {
        ProviderSettings {
            base_url: self.provider_url.trim_end_matches('/').to_string(),
            chat_model: self.chat_model.clone(),
            image_model: self.image_model.clone(),
            referer: self.referer.clone(),
            app_title: self.app_title.clone(),
        }
    }

    pub fn state_options(&self) -> StateOptions {
        StateOptions {
            queue_depth: self.queue_depth,
            max_in_flight: self.max_in_flight,
            cache_ttl: Duration::from_secs(self.cache_ttl),
            trust_proxy_headers: self.trust_proxy_headers,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_original_deployment() {
        let args = Args::try_parse_from(["gateway", "--api-keys", "sk-a,sk-b"]).unwrap();

        assert_eq!(args.rate_limit, 50);
        assert_eq!(args.rate_window(), Duration::from_secs(3600));
        assert_eq!(args.bind_addr(), "127.0.0.1:8000");
        assert_eq!(args.provider_settings().base_url, "https://openrouter.ai/api/v1");
        assert!(!args.state_options().trust_proxy_headers);
    }

    #[test]
    fn proxy_headers_are_opt_in() {
        let args =
            Args::try_parse_from(["gateway", "--api-keys", "sk-a", "--trust-proxy-headers"])
                .unwrap();
        assert!(args.state_options().trust_proxy_headers);
    }

    #[test]
    fn zero_rate_limit_is_rejected() {
        let parsed =
            Args::try_parse_from(["gateway", "--api-keys", "sk-a", "--rate-limit", "0"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn trailing_slash_is_trimmed_from_provider_url() {
        let args = Args::try_parse_from([
            "gateway",
            "--api-keys",
            "sk-a",
            "--provider-url",
            "http://localhost:9000/v1/",
        ])
        .unwrap();
        assert_eq!(args.provider_settings().base_url, "http://localhost:9000/v1");
    }
}
