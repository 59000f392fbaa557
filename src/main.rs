use clap::Parser; // for cli
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

use craft_copilot_gateway::{
    clock::{Clock, SystemClock},
    config::Args,
    create_app,
    key_pool::{KeyPool, health_checker},
    provider::OpenRouterClient,
    rate_limit::RequestThrottle,
    state::{AppState, sweeper},
};

// this is main async function with tokio
#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    if let Err(e) = run(Args::parse()).await {
        error!("Gateway stopped: {}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let client = reqwest::Client::new();
    let settings = args.provider_settings();

    let key_pool = Arc::new(KeyPool::new(&args.api_keys)?);
    let provider = Arc::new(OpenRouterClient::new(
        client.clone(),
        Arc::clone(&key_pool),
        settings.clone(),
    ));

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let throttle = RequestThrottle::with_clock(args.rate_limit, args.rate_window(), clock);

    // creating shared state (spawns the batch worker)
    let state = AppState::start(throttle, provider, args.state_options());

    tokio::spawn(health_checker(
        key_pool,
        client,
        settings.base_url.clone(),
        Duration::from_secs(args.health_interval),
    ));
    tokio::spawn(sweeper(
        Arc::clone(&state),
        Duration::from_secs(args.sweep_interval),
    ));

    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(args.bind_addr()).await?;

    info!("Gateway running on http://{}", listener.local_addr()?);
    info!("Forwarding to provider at {}", settings.base_url);
    info!("Cache TTL: {} seconds", args.cache_ttl);
    info!(
        "Rate limit: {} requests per {} seconds per user",
        args.rate_limit, args.rate_window
    );

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
