use axum::Router;
use dotenvy::dotenv;
use std::env;
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod routes;
mod handlers;
mod services;
mod models;
mod types;
mod utils;


fn init_tracing() {
    let filter = env::var("RUST_LOG").unwrap_or_else(|_| "info".into());
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(filter))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Resolves on Ctrl-C, or SIGTERM where the platform has it.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.ok();
    };
    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        if let Ok(mut sig) = signal(SignalKind::terminate()) {
            sig.recv().await;
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();
    tokio::select! { _ = ctrl_c => {}, _ = terminate => {} }
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    dotenv().ok();
    init_tracing();

    let cfg = config::AppConfig::from_env()?;
    let state = cfg.build_state()?;

    // Whole-cache clear; lives as long as the server does.
    let expiry = state.rates.cache().spawn_expiry(cfg.cache_ttl);
    info!(every_secs = cfg.cache_ttl.as_secs(), "rate cache expiry scheduled");

    let app: Router = routes::router(state);
    let listener = TcpListener::bind(SocketAddr::from(([0, 0, 0, 0], cfg.port))).await?;
    let addr = listener.local_addr()?;
    info!(%addr, provider = %cfg.provider, "conversion API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    expiry.abort();
    Ok(())
}
