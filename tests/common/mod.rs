// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::Body;
use axum::http::Response;
use serde_json::{json, Value};
use std::sync::Arc;
use strava_mirror::config::Config;
use strava_mirror::db::FirestoreDb;
use strava_mirror::routes::create_router;
use strava_mirror::AppState;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Create a mock database connection (offline).
#[allow(dead_code)]
pub fn test_db_offline() -> FirestoreDb {
    FirestoreDb::new_mock()
}

/// Build the router over the given database.
#[allow(dead_code)]
pub fn create_app_with_db(db: FirestoreDb) -> axum::Router {
    let state = Arc::new(AppState {
        config: Config::test_default(),
        db,
    });
    create_router(state)
}

/// Create a test app with an offline mock database.
#[allow(dead_code)]
pub fn create_test_app() -> axum::Router {
    create_app_with_db(test_db_offline())
}

/// A valid API activity body.
#[allow(dead_code)]
pub fn activity_json(id: u64, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "type": "Ride",
        "distance": 24123.4,
        "moving_time": 3600,
        "elapsed_time": 3900,
        "total_elevation_gain": 310.0,
        "sport_type": "MountainBikeRide",
        "start_date": "2024-03-09T17:05:42Z",
        "start_date_local": "2024-03-09T09:05:42Z",
        "timezone": "(GMT-08:00) America/Los_Angeles",
        "polyline": "_p~iF~ps|U_ulLnnqC_mqNvxq`@",
        "decoded_polyline": [[38.5, -120.2], [40.7, -120.95], [43.252, -126.453]],
        "average_speed": 6.7
    })
}

/// Generate a unique activity ID for test isolation.
#[allow(dead_code)]
pub fn unique_activity_id() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos() as u64
}

/// Read a response body as JSON.
#[allow(dead_code)]
pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
