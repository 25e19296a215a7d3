//! Main entry point for the imageforge server

use std::sync::Arc;

use imageforge::{
    api, config::Settings, gateway::FluxGateway, store::PgStore, AppState,
};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Load configuration
    let settings = Settings::load()?;
    settings.validate()?;

    // Initialize logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.logging.level.clone()));

    if settings.logging.format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer())
            .init();
    }

    info!("Starting imageforge server");

    // Connect storage and external providers
    let store = Arc::new(PgStore::connect(&settings.database).await?);
    let gateway = Arc::new(FluxGateway::new(&settings.provider, &settings.storage).await?);
    info!(
        model = %settings.provider.model,
        bucket = %settings.storage.bucket,
        "Connected to database, provider, and object storage"
    );

    // Create application state and router
    let state = AppState::new(settings.clone(), store.clone(), store, gateway);
    let app = api::routes::create_router(state);

    // Start the server
    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
