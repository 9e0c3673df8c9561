//! Hot Topics chat server.
//!
//! Refreshes its chatrooms from a trends API and relays chat messages between
//! the WebSocket clients in each room.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin hottopics-server
//! cargo run --bin hottopics-server -- --host 0.0.0.0 --port 8025 --topics Rust,Tokio
//! cargo run --bin hottopics-server -- --trends-endpoint https://api.twitter.com/1.1/trends/place.json --trends-token $TOKEN
//! ```

use std::sync::Arc;

use clap::Parser;
use hottopics_server::{
    config::{ServerArgs, ServerConfig},
    domain::TrendSource,
    infrastructure::trends::{HttpTrendSource, StaticTrendSource},
    ui::Server,
};
use hottopics_shared::{logger::setup_logger, time::SystemClock};

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let config = match ServerConfig::try_from(ServerArgs::parse()) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {}", e);
            std::process::exit(2);
        }
    };

    let trend_source: Arc<dyn TrendSource> = match &config.trends.endpoint {
        Some(endpoint) => {
            tracing::info!("Fetching trends from {}", endpoint);
            Arc::new(HttpTrendSource::new(
                endpoint.clone(),
                config.trends.bearer_token.clone(),
            ))
        }
        None if config.trends.fallback_topics.is_empty() => {
            tracing::info!("No trends endpoint configured, using default topics");
            Arc::new(StaticTrendSource::default())
        }
        None => {
            tracing::info!("No trends endpoint configured, using fixed topics");
            Arc::new(StaticTrendSource::new(config.trends.fallback_topics.clone()))
        }
    };

    let server = Server::build(&config, trend_source, Arc::new(SystemClock));
    if let Err(e) = server.run(config.host.clone(), config.port).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
