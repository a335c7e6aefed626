// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Food-Ledger API Server
//!
//! Turns food intake reports into nutrition data and tracks each user's
//! daily nutrient budget.

use food_ledger::{
    config::{Config, StoreBackend},
    db::{FirestoreDb, MemoryStore, NutritionStore},
    services::{BrandCatalog, DailyGoalLedger, IntakeService, OpenAiExtractor},
    AppState,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured JSON logging for GCP
    init_logging()?;

    // Load configuration from environment
    let config = Config::from_env()?;
    tracing::info!(port = config.port, "Starting Food-Ledger API");

    // Initialize the store
    let store: Arc<dyn NutritionStore> = match config.store_backend {
        StoreBackend::Firestore => Arc::new(FirestoreDb::new(&config.gcp_project_id).await?),
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; data is lost on restart");
            Arc::new(MemoryStore::new())
        }
    };

    // Load the brand catalog
    tracing::info!(path = %config.brand_catalog_path, "Loading brand catalog");
    let catalog = Arc::new(BrandCatalog::load_from_file(&config.brand_catalog_path)?);

    let extractor = Arc::new(OpenAiExtractor::from_config(&config));
    tracing::info!(
        base_url = %config.openai_base_url,
        model = %config.openai_model,
        "Nutrition extractor initialized"
    );

    let intake = IntakeService::new(
        extractor,
        catalog,
        DailyGoalLedger::new(store.clone()),
        config.ledger_offset(),
        config.max_image_bytes,
    );

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        store,
        intake,
    });

    // Build router
    let app = food_ledger::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging (GCP-compliant).
fn init_logging() -> Result<(), Box<dyn std::error::Error>> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("food_ledger=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();
    Ok(())
}
