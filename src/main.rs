// SPDX-License-Identifier: MIT

//! Eighty Ways API Server
//!
//! Hosts the energy ledger, journey tracker, and checkout boundary for
//! "Around the World in 80 Ways".

use eighty_ways::{
    config::Config,
    services::{BillingService, JourneyCatalog, RaidBoard},
    store::{JsonFileStore, MemoryStore, SessionManager, SessionStore},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging
    init_logging();

    // Load configuration from environment
    let config = Config::from_env().expect("Failed to load configuration");
    tracing::info!(port = config.port, "Starting Eighty Ways API");

    // Load the journey catalog
    tracing::info!(path = %config.journey_catalog_path, "Loading journey catalog");
    let catalog = JourneyCatalog::load_from_file(&config.journey_catalog_path)
        .expect("Failed to load journey catalog");
    tracing::info!(
        legs = catalog.len(),
        total_km = catalog.total_distance_km(),
        "Journey catalog loaded"
    );

    // Pick the session store: JSON files when a data dir is configured,
    // in-memory otherwise
    let store: Arc<dyn SessionStore> = match &config.data_dir {
        Some(dir) => {
            tracing::info!(dir = %dir.display(), "Using JSON file session store");
            Arc::new(JsonFileStore::new(dir.clone()))
        }
        None => {
            tracing::warn!("DATA_DIR not set; sessions are held in memory only");
            Arc::new(MemoryStore::new())
        }
    };
    let sessions = SessionManager::new(store);

    // Seed the raid board
    let raids = Arc::new(RaidBoard::seed(chrono::Utc::now()));

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        sessions,
        catalog,
        raids,
        billing: BillingService::new(),
    });

    // Build router
    let app = eighty_ways::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("eighty_ways=debug".parse().expect("valid directive"))
                .add_directive("info".parse().expect("valid directive")),
        )
        .with(format)
        .init();
}
