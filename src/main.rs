// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Strava-Mirror API Server
//!
//! Serves the mirrored Strava activities stored in Firestore.

use strava_mirror::{config::Config, db::FirestoreDb, logging::init_logging, AppState};
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration from environment
    let config = Config::from_env()?;

    let log_dir = init_logging(config.log_dir.as_deref(), "api")?;
    tracing::info!(port = config.port, log_dir = ?log_dir, "Starting Strava-Mirror API");

    // Initialize Firestore database
    let db = FirestoreDb::new(&config.gcp_project_id)
        .await?
        .with_collection(&config.activities_collection);

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        db,
    });

    // Build router
    let app = strava_mirror::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}
