//! TechCraft - demo backend for an AI DIY-project assistant
//!
//! Serves scripted chat sessions driven by a small state machine, plus the
//! sample catalog, learning and community data shown around the chat.

mod api;
mod catalog;
mod config;
mod runtime;
mod state_machine;
mod toolkit;

use api::{create_router, AppState};
use catalog::SqliteCatalog;
use chrono::Utc;
use config::ServerConfig;
use runtime::SessionManager;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "techcraft=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    let config = ServerConfig::from_env();
    tracing::info!(
        port = config.port,
        reply_delay_ms = u64::try_from(config.reply_delay.as_millis()).unwrap_or(u64::MAX),
        max_sessions = config.max_sessions,
        session_idle_secs = config.session_idle.as_secs(),
        "Loaded configuration"
    );

    // Sample data is rebuilt on every start
    let catalog = SqliteCatalog::open_seeded(Utc::now())?;
    let sessions = Arc::new(SessionManager::new(config.session_config()));
    let _reaper = sessions.spawn_reaper();

    let state = AppState::new(sessions.clone(), Arc::new(catalog));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let compression = CompressionLayer::new()
        .gzip(true)
        .br(true)
        .deflate(true)
        .zstd(true);

    let app = create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(compression);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("TechCraft server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(sessions))
        .await?;

    Ok(())
}

/// Resolve on Ctrl-C, closing every chat session first
async fn shutdown_signal(sessions: Arc<SessionManager>) {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
    sessions.close_all().await;
}
