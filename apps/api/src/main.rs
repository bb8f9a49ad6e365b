mod analysis;
mod auth;
mod config;
mod errors;
mod extract;
mod models;
mod resumes;
mod routes;
mod state;
mod storage;
#[cfg(test)]
mod testing;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::{AnalysisClient, AnalysisConfig};
use crate::config::Config;
use crate::extract::DocumentExtractor;
use crate::resumes::repository::PgResumeStore;
use crate::resumes::service::ResumeService;
use crate::routes::build_router;
use crate::state::AppState;
use crate::storage::S3ObjectStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resume API v{}", env!("CARGO_PKG_VERSION"));

    let records = PgResumeStore::connect(&config.database_url).await?;
    let objects = S3ObjectStore::from_config(&config).await?;

    let analyzer = AnalysisClient::new(AnalysisConfig::new(config.analysis_service_url.clone()))?;
    info!("Analysis client initialized ({})", analyzer.base_url());

    let resumes = ResumeService::new(
        Arc::new(records),
        Arc::new(objects),
        Arc::new(analyzer),
        Arc::new(DocumentExtractor),
    )
    .with_max_upload_bytes(config.max_upload_bytes);

    let app = build_router(AppState { resumes })
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("Received Ctrl+C, shutting down");
}
