//! Response Cache - a caching front for rate-limited upstream APIs
//!
//! Serves a memory-bounded LRU cache with TTL expiry over HTTP.

use std::net::SocketAddr;

use anyhow::Context;
use tokio::{signal, task::JoinHandle};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use response_cache::{api::create_router, spawn_sweep_task, AppState, Config};

/// Main entry point for the response cache server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load and validate configuration from environment variables
/// 3. Create the shared cache with configured bounds
/// 4. Start the background TTL sweep unless disabled
/// 5. Create Axum router with all endpoints
/// 6. Start HTTP server on configured port
/// 7. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "response_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting response cache server");

    let config = Config::from_env();
    config.validate().context("invalid cache configuration")?;
    info!(
        "Configuration loaded: max_size={}, ttl_ms={}, max_memory_bytes={}, warning_threshold={}, port={}, sweep_interval_ms={}",
        config.cache.max_size,
        config.cache.ttl.as_millis(),
        config.cache.max_memory_bytes,
        config.cache.memory_warning_threshold,
        config.server_port,
        config.sweep_interval_ms
    );

    let state = AppState::from_config(&config).context("failed to create cache")?;
    info!("Cache initialized");

    let sweep_handle = match config.sweep_interval() {
        Some(interval) => Some(spawn_sweep_task(state.cache.clone(), interval)),
        None => {
            info!("TTL sweep disabled; expired entries are reclaimed on access");
            None
        }
    };

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(sweep_handle))
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown signal, aborts the sweep task and allows graceful shutdown.
async fn shutdown_signal(sweep_handle: Option<JoinHandle<()>>) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    if let Some(handle) = sweep_handle {
        handle.abort();
        warn!("TTL sweep task aborted");
    }
}
