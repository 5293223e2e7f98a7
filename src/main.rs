use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;

use ragbot_backend::core::config::AppPaths;
use ragbot_backend::core::logging;
use ragbot_backend::server;
use ragbot_backend::state::{load_settings, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let paths = Arc::new(AppPaths::from_env());
    let settings = load_settings(paths.clone())?;
    logging::init(&paths, &settings.logging.level);
    tracing::info!("Data directory: {}", paths.data_dir.display());

    let state = AppState::from_settings(paths, settings)?;
    tracing::info!(
        "Retrieval pipeline ready (embedder = {}, generator = {}, dim = {}, top_k = {})",
        state.pipeline.embedder_name(),
        state.pipeline.generator_name(),
        state.pipeline.dimension(),
        state.pipeline.top_k()
    );

    let bind_addr = format!(
        "{}:{}",
        state.settings.server.host, state.settings.server.port
    );
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_addr))?;
    let addr = listener.local_addr()?;

    println!("RAGBOT_PORT={}", addr.port());
    tracing::info!("Listening on {}", addr);

    let app: Router = server::router::router(state.clone());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", err);
        return;
    }
    tracing::info!("Shutdown signal received");
}
