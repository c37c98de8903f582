// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Periodic mirror of the athlete's Strava activities into Firestore.
//!
//! Each cycle:
//! 1. Refresh the access token (failure ends the process)
//! 2. Walk the activity list page by page until an empty page
//! 3. Normalize each record and upsert it by Strava ID
//!
//! Bad records are logged and skipped. Cycles repeat forever with a fixed
//! sleep in between.

use crate::config::SyncConfig;
use crate::db::FirestoreDb;
use crate::error::{AppError, Result};
use crate::models::{ActivityDocument, RoutePoint};
use crate::services::polyline::decode_polyline;
use crate::services::strava::{StravaActivitySummary, StravaClient};
use crate::services::token::TokenManager;
use crate::time_utils::{format_utc_rfc3339, parse_strava_local, parse_strava_utc};
use serde_json::{Map, Value};
use std::time::Duration;

/// Counters for one sync cycle.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SyncSummary {
    /// Non-empty pages processed
    pub pages: u32,
    pub saved: u32,
    pub failed: u32,
}

/// Orchestrates token refresh, paging and storage.
pub struct SyncService {
    client: StravaClient,
    tokens: TokenManager,
    db: FirestoreDb,
    per_page: u32,
    interval: Duration,
}

impl SyncService {
    pub fn new(config: &SyncConfig, db: FirestoreDb) -> Self {
        let client = StravaClient::new(
            config.strava_api_url.clone(),
            config.strava_token_url.clone(),
            config.strava_client_id.clone(),
            config.strava_client_secret.clone(),
        );
        let tokens = TokenManager::new(client.clone(), config.strava_refresh_token.clone());

        Self {
            client,
            tokens,
            db,
            per_page: config.activities_per_page,
            interval: config.sync_interval(),
        }
    }

    /// Run sync cycles forever. Only returns on a fatal error.
    pub async fn run_forever(&mut self) -> Result<()> {
        loop {
            self.run_cycle().await?;

            tracing::info!(
                hours = self.interval.as_secs() / 3600,
                "Waiting for the next sync"
            );
            tokio::time::sleep(self.interval).await;
        }
    }

    /// Run one full sync cycle.
    pub async fn run_cycle(&mut self) -> Result<SyncSummary> {
        let started_at = chrono::Utc::now();
        tracing::info!(started_at = %format_utc_rfc3339(started_at), "Starting sync");

        self.tokens.refresh().await?;

        let mut summary = SyncSummary::default();
        let mut page = 1;

        loop {
            // Long backfills can outlive a token.
            if self.tokens.is_expiring() {
                self.tokens.refresh().await?;
            }

            tracing::info!(page, "Fetching page");
            let activities = self.fetch_page(page, self.per_page).await;

            if activities.is_empty() {
                tracing::info!(page, "No more activities to fetch");
                break;
            }

            let (saved, failed) = self.save_activities(activities).await;
            summary.pages += 1;
            summary.saved += saved;
            summary.failed += failed;
            page += 1;
        }

        tracing::info!(
            pages = summary.pages,
            saved = summary.saved,
            failed = summary.failed,
            elapsed_secs = (chrono::Utc::now() - started_at).num_seconds(),
            "Sync complete"
        );

        Ok(summary)
    }

    /// Fetch one page of activities. Any failure is logged and reported as
    /// an empty page, which ends pagination for this cycle.
    pub async fn fetch_page(&self, page: u32, per_page: u32) -> Vec<Value> {
        let Some(access_token) = self.tokens.access_token() else {
            tracing::error!(page, "No access token available, skipping fetch");
            return Vec::new();
        };

        match self
            .client
            .list_activities(access_token, page, per_page)
            .await
        {
            Ok(activities) => activities,
            Err(e) => {
                tracing::error!(page, error = %e, "Error fetching activities");
                Vec::new()
            }
        }
    }

    /// Normalize and upsert a page of records. Returns `(saved, failed)`.
    pub async fn save_activities(&self, activities: Vec<Value>) -> (u32, u32) {
        let mut saved = 0;
        let mut failed = 0;

        for raw in activities {
            let raw_id = raw.get("id").cloned().unwrap_or(Value::Null);

            match self.save_activity(raw).await {
                Ok(doc) => {
                    tracing::info!(activity_id = doc.id, name = %doc.name, "Saved activity");
                    saved += 1;
                }
                Err(e) => {
                    tracing::error!(activity_id = %raw_id, error = %e, "Error saving activity");
                    failed += 1;
                }
            }
        }

        (saved, failed)
    }

    async fn save_activity(&self, raw: Value) -> Result<ActivityDocument> {
        let doc = build_document(raw)?;
        self.db.upsert_activity(&doc).await?;
        Ok(doc)
    }
}

/// Build the stored document from one raw Strava record.
pub fn build_document(raw: Value) -> Result<ActivityDocument> {
    let summary: StravaActivitySummary = serde_json::from_value(raw.clone())
        .map_err(|e| AppError::StravaApi(format!("Unexpected activity payload: {}", e)))?;

    let polyline = summary.summary_polyline().map(str::to_string);
    let decoded_polyline = decode_polyline(polyline.as_deref())
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e)))?
        .map(|points| {
            points
                .into_iter()
                .map(|[lat, lon]| RoutePoint { lat, lon })
                .collect()
        });

    let start_date = parse_strava_utc(&summary.start_date).map_err(|e| {
        AppError::BadRequest(format!("Invalid start_date {:?}: {}", summary.start_date, e))
    })?;
    let start_date_local = parse_strava_local(&summary.start_date_local).map_err(|e| {
        AppError::BadRequest(format!(
            "Invalid start_date_local {:?}: {}",
            summary.start_date_local, e
        ))
    })?;

    Ok(ActivityDocument {
        doc_id: None,
        id: summary.id,
        sport_type: summary.sport_type().to_string(),
        gear: summary.gear(),
        name: summary.name,
        activity_type: summary.activity_type,
        distance: summary.distance,
        moving_time: summary.moving_time,
        elapsed_time: summary.elapsed_time,
        total_elevation_gain: summary.total_elevation_gain,
        start_date,
        start_date_local,
        timezone: summary.timezone,
        map: summary.map.map(without_null_members),
        polyline,
        decoded_polyline,
        average_speed: summary.average_speed,
        max_speed: summary.max_speed,
        average_heartrate: summary.average_heartrate,
        max_heartrate: summary.max_heartrate,
        average_cadence: summary.average_cadence,
        calories: summary.calories,
        photos: None,
        raw_data: Some(strip_nulls(raw)),
    })
}

/// Drop `null` members, recursively. Firestore does not keep them in maps,
/// so removing them up front makes the stored copy read back unchanged.
fn without_null_members(fields: Map<String, Value>) -> Map<String, Value> {
    fields
        .into_iter()
        .filter(|(_, value)| !value.is_null())
        .map(|(key, value)| (key, strip_nulls(value)))
        .collect()
}

fn strip_nulls(value: Value) -> Value {
    match value {
        Value::Object(fields) => Value::Object(without_null_members(fields)),
        Value::Array(items) => Value::Array(items.into_iter().map(strip_nulls).collect()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn strava_record() -> Value {
        json!({
            "id": 10911393245u64,
            "name": "Rancho loop",
            "type": "Run",
            "sport_type": "TrailRun",
            "distance": 10012.3,
            "moving_time": 3700,
            "elapsed_time": 4100,
            "total_elevation_gain": 420.5,
            "start_date": "2024-03-09T17:05:42Z",
            "start_date_local": "2024-03-09T09:05:42Z",
            "timezone": "(GMT-08:00) America/Los_Angeles",
            "map": { "id": "a10911393245", "summary_polyline": "_p~iF~ps|U_ulLnnqC_mqNvxq`@" },
            "average_heartrate": 151.2,
            "kudos_count": 3
        })
    }

    #[test]
    fn test_build_document_normalizes_record() {
        let doc = build_document(strava_record()).unwrap();

        assert_eq!(doc.id, 10911393245);
        assert_eq!(doc.sport_type, "TrailRun");
        assert_eq!(
            doc.start_date,
            Utc.with_ymd_and_hms(2024, 3, 9, 17, 5, 42).unwrap()
        );
        assert_eq!(
            doc.start_date_local,
            Utc.with_ymd_and_hms(2024, 3, 9, 9, 5, 42).unwrap()
        );
        assert_eq!(doc.polyline.as_deref(), Some("_p~iF~ps|U_ulLnnqC_mqNvxq`@"));

        let route = doc.decoded_polyline.unwrap();
        assert_eq!(route.len(), 3);
        assert!((route[0].lat - 38.5).abs() < 1e-9);
        assert!((route[0].lon + 120.2).abs() < 1e-9);

        assert_eq!(doc.average_heartrate, Some(151.2));
        assert!(doc.max_heartrate.is_none());
        // Fields we don't model survive in the raw copy.
        assert_eq!(doc.raw_data.unwrap()["kudos_count"], 3);
    }

    #[test]
    fn test_build_document_without_route() {
        let mut record = strava_record();
        record["map"] = json!({ "id": "a1", "summary_polyline": "" });

        let doc = build_document(record).unwrap();
        assert_eq!(doc.polyline.as_deref(), Some(""));
        assert!(doc.decoded_polyline.is_none());
    }

    #[test]
    fn test_build_document_rejects_offset_in_utc_start() {
        let mut record = strava_record();
        record["start_date"] = json!("2024-03-09T17:05:42+00:00");

        assert!(matches!(
            build_document(record),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn test_build_document_rejects_missing_name() {
        let mut record = strava_record();
        record.as_object_mut().unwrap().remove("name");

        assert!(matches!(build_document(record), Err(AppError::StravaApi(_))));
    }

    #[test]
    fn test_build_document_drops_null_members() {
        let mut record = strava_record();
        record["workout_type"] = Value::Null;
        record["map"]["summary_polyline"] = Value::Null;
        record["segment_efforts"] = json!([{ "id": 1, "pr_rank": null }]);

        let doc = build_document(record).unwrap();

        let map = doc.map.unwrap();
        assert!(!map.contains_key("summary_polyline"));
        assert_eq!(map["id"], "a10911393245");
        assert!(doc.decoded_polyline.is_none());

        let raw = doc.raw_data.unwrap();
        assert!(raw.get("workout_type").is_none());
        assert!(raw["map"].get("summary_polyline").is_none());
        assert_eq!(raw["segment_efforts"], json!([{ "id": 1 }]));
        assert_eq!(raw["kudos_count"], 3);
    }
}
