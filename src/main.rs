// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;

use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use crate::application::insights_service::InsightsService;
use crate::infrastructure::config::{load_crux_config, load_server_config};
use crate::infrastructure::crux_client::HttpCruxRepository;
use crate::presentation::app_state::AppState;
use crate::presentation::router::build_router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Load configuration; a missing API key or endpoint stops startup here
    let crux_config = load_crux_config()?;
    let server_config = load_server_config()?;
    tracing::debug!("CrUX settings: {:?}", crux_config);

    // Create repository (infrastructure layer)
    let repository = Arc::new(HttpCruxRepository::new(&crux_config)?);

    // Create services (application layer)
    let insights_service = InsightsService::new(repository);

    // Create application state
    let state = Arc::new(AppState { insights_service });

    // Build router (presentation layer)
    let router = build_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(server_config.bind_addr).await?;
    tracing::info!("Starting vitals-report service on {}", server_config.bind_addr);

    axum::serve(listener, router).await?;

    Ok(())
}
