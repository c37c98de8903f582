// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Strava-Mirror sync process
//!
//! Mirrors the athlete's Strava activities into Firestore on a fixed
//! interval. Exits non-zero if the database is unreachable at startup or a
//! token refresh fails.

use strava_mirror::{
    config::{Config, SyncConfig},
    db::FirestoreDb,
    logging::init_logging,
    services::SyncService,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;
    let sync_config = SyncConfig::from_env()?;

    let log_dir = init_logging(config.log_dir.as_deref(), "sync")?;
    tracing::info!(
        interval_hours = sync_config.sync_interval_hours,
        per_page = sync_config.activities_per_page,
        log_dir = ?log_dir,
        "Starting Strava-Mirror sync"
    );

    let db = match FirestoreDb::new(&config.gcp_project_id).await {
        Ok(db) => db.with_collection(&config.activities_collection),
        Err(e) => {
            tracing::error!(error = %e, "Error connecting to database");
            return Err(e.into());
        }
    };
    if let Err(e) = db.initialize().await {
        tracing::error!(error = %e, "Error initializing database");
        return Err(e.into());
    }

    let mut sync = SyncService::new(&sync_config, db);
    let err = match sync.run_forever().await {
        Ok(()) => return Ok(()),
        Err(e) => e,
    };

    tracing::error!(error = %err, "Sync stopped");
    Err(err.into())
}
