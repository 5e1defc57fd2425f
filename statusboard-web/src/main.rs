//! statusboard-web - Brigade status dashboard service
//!
//! Loads brigade and tag data from the status board API, keeps it fresh on
//! an interval and serves filtered views to the browser front end.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use statusboard_common::config::load_config;
use statusboard_common::{HttpDataSource, Store};
use statusboard_web::{build_router, AppState};
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for statusboard-web
#[derive(Parser, Debug)]
#[command(name = "statusboard-web")]
#[command(about = "Brigade status dashboard service")]
#[command(version)]
struct Args {
    /// Port to listen on (overrides config file)
    #[arg(short, long, env = "STATUSBOARD_PORT")]
    port: Option<u16>,

    /// Base URL of the status board API (overrides config file)
    #[arg(long, env = "STATUSBOARD_API_URL")]
    api_url: Option<String>,

    /// Path to TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = load_config(args.config.as_deref()).context("Failed to load configuration")?;
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(api_url) = args.api_url {
        config.api_base_url = api_url;
    }

    // Initialize tracing; RUST_LOG wins over the configured level
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!(
                    "statusboard_web={level},statusboard_common={level},tower_http={level}",
                    level = config.logging.level
                )
                .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Log build identification immediately after tracing init
    info!(
        "Starting statusboard-web v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    info!("Status board API: {}", config.api_base_url);

    let source = HttpDataSource::new(&config.api_base_url, config.request_timeout())
        .context("Failed to create API client")?;
    let store = Arc::new(Store::new(Arc::new(source)));

    // Initial load runs in the background; the UI sees Loading until it settles
    {
        let store = Arc::clone(&store);
        tokio::spawn(async move {
            let outcome = store.load_all().await;
            if !outcome.is_ok() {
                warn!("Initial load incomplete: {:?}", outcome);
            }
        });
    }

    let refresh = config
        .refresh_interval()
        .map(|interval| store.start_auto_refresh(interval));
    if refresh.is_none() {
        info!("Auto-refresh disabled");
    }

    let app = build_router(AppState::new(Arc::clone(&store)));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Starting HTTP server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    if let Some(refresh) = refresh {
        refresh.shutdown().await;
    }

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
