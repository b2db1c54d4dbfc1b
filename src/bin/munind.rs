//! munind — Muninn daemon.
//!
//! Serves the [`ContentGateway`](muninn::ContentGateway) over HTTP,
//! fronting the photo and feed provider chains for browser clients.

use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use muninn::server::{AppState, Config, create_router};
use muninn::{Muninn, SlidingWindowLimiter};

/// Muninn daemon — content aggregation gateway.
#[derive(Parser)]
#[command(name = "munind")]
#[command(version)]
#[command(about = "Muninn content aggregation daemon")]
struct Args {
    /// Port to listen on (overrides the PORT environment variable).
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Local .env is a convenience for development; absence is fine.
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("muninn=info,tower_http=info")),
        )
        .init();

    let args = Args::parse();
    let config = Config::from_env()?;

    let gateway = build_gateway(&config)?;
    let limiter = SlidingWindowLimiter::new(&config.rate_limit);

    let state = AppState {
        gateway: Arc::new(gateway),
        limiter: Arc::new(limiter),
    };
    let app = create_router(state);

    let port = args.port.unwrap_or(config.port);
    let addr: SocketAddr = format!("{}:{}", config.bind, port).parse()?;

    info!(%addr, "munind starting");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let server = axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    );

    tokio::select! {
        result = server => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown signal received");
        }
    }

    Ok(())
}

/// Build a [`ContentGateway`](muninn::ContentGateway) from configuration.
///
/// Only providers with a credential present are registered; the chains
/// always end in the static fallbacks regardless.
fn build_gateway(config: &Config) -> muninn::Result<muninn::ContentGateway> {
    let mut builder = Muninn::builder()
        .timeout(config.upstream_timeout_secs)
        .cache(config.cache_config());

    if let Some(ref key) = config.pexels_api_key {
        builder = builder.pexels(key.clone());
    }

    if let Some(ref key) = config.unsplash_access_key {
        builder = builder.unsplash(key.clone());
    }

    builder.build()
}
