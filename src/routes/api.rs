// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Activity CRUD routes.

use crate::error::{AppError, Result};
use crate::models::{Activity, ActivityDocument};
use crate::AppState;
use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        Path, Query, State,
    },
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use validator::Validate;

/// Field omitted from list responses unless explicitly requested.
const DECODED_POLYLINE_FIELD: &str = "decoded_polyline";

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/activities", get(list_activities).post(create_activity))
        .route(
            "/activities/{id}",
            get(get_activity)
                .put(update_activity)
                .delete(delete_activity),
        )
}

/// Plain message response.
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Extractor failures (bad JSON, bad query values, non-numeric IDs) are
/// validation errors.
fn invalid(rejection: impl std::fmt::Display) -> AppError {
    AppError::Validation(rejection.to_string())
}

// ─── List ────────────────────────────────────────────────────

#[derive(Debug, Deserialize, Validate)]
pub struct ListQuery {
    /// Number of activities to return (all when unset)
    #[validate(range(min = 1, max = 1000))]
    pub limit: Option<u32>,
    /// Number of activities to skip
    #[serde(default)]
    pub offset: u32,
    /// Include `decoded_polyline` in each item
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub include_polyline: bool,
}

/// Parse a boolean query flag. Accepts `true/false`, `1/0`, `yes/no`,
/// `on/off` and their one-letter forms, case-insensitively.
fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "t" | "1" | "yes" | "y" | "on" => Some(true),
        "false" | "f" | "0" | "no" | "n" | "off" => Some(false),
        _ => None,
    }
}

fn deserialize_flag<'de, D>(deserializer: D) -> std::result::Result<bool, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_flag(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid boolean value: {:?}", raw)))
}

/// Render one activity for a list response.
fn list_item(activity: Activity, include_polyline: bool) -> Result<Value> {
    let mut value =
        serde_json::to_value(activity).map_err(|e| AppError::Internal(anyhow::anyhow!(e)))?;
    if !include_polyline {
        if let Some(fields) = value.as_object_mut() {
            fields.remove(DECODED_POLYLINE_FIELD);
        }
    }
    Ok(value)
}

/// List activities with optional pagination. Default is to return all.
async fn list_activities(
    State(state): State<Arc<AppState>>,
    query: std::result::Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<Vec<Value>>> {
    let Query(params) = query.map_err(invalid)?;
    params.validate().map_err(invalid)?;

    tracing::info!(
        limit = ?params.limit,
        offset = params.offset,
        include_polyline = params.include_polyline,
        "Fetching activities"
    );

    let documents = state.db.list_activities(params.offset, params.limit).await?;

    let items = documents
        .into_iter()
        .map(|doc| list_item(doc.into(), params.include_polyline))
        .collect::<Result<Vec<_>>>()?;

    tracing::info!(count = items.len(), "Fetched activities");
    Ok(Json(items))
}

// ─── Single Activity ─────────────────────────────────────────

/// Get a single activity by its Strava ID.
async fn get_activity(
    State(state): State<Arc<AppState>>,
    path: std::result::Result<Path<u64>, PathRejection>,
) -> Result<Json<Activity>> {
    let Path(activity_id) = path.map_err(invalid)?;

    let doc = state
        .db
        .get_activity(activity_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Activity not found".to_string()))?;

    Ok(Json(doc.into()))
}

/// Add a new activity.
async fn create_activity(
    State(state): State<Arc<AppState>>,
    body: std::result::Result<Json<Activity>, JsonRejection>,
) -> Result<Json<Activity>> {
    let Json(activity) = body.map_err(invalid)?;
    let activity_id = activity.id;

    let created = state
        .db
        .create_activity(&ActivityDocument::from(activity))
        .await?;

    tracing::info!(activity_id, "Activity created");
    Ok(Json(created.into()))
}

/// Replace an existing activity. The path ID wins over the body's `id`.
async fn update_activity(
    State(state): State<Arc<AppState>>,
    path: std::result::Result<Path<u64>, PathRejection>,
    body: std::result::Result<Json<Activity>, JsonRejection>,
) -> Result<Json<Activity>> {
    let Path(activity_id) = path.map_err(invalid)?;
    let Json(mut activity) = body.map_err(invalid)?;

    if activity.id != activity_id {
        tracing::warn!(
            activity_id,
            body_id = activity.id,
            "Body ID differs from path ID, keeping path ID"
        );
        activity.id = activity_id;
    }

    let updated = state
        .db
        .replace_activity(activity_id, &ActivityDocument::from(activity))
        .await?;

    tracing::info!(activity_id, "Activity updated");
    Ok(Json(updated.into()))
}

/// Delete an activity by its Strava ID.
async fn delete_activity(
    State(state): State<Arc<AppState>>,
    path: std::result::Result<Path<u64>, PathRejection>,
) -> Result<Json<MessageResponse>> {
    let Path(activity_id) = path.map_err(invalid)?;

    state.db.delete_activity(activity_id).await?;

    tracing::info!(activity_id, "Activity deleted");
    Ok(Json(MessageResponse {
        message: format!("Activity {} deleted successfully", activity_id),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn activity() -> Activity {
        serde_json::from_value(json!({
            "id": 7,
            "name": "Hike",
            "type": "Hike",
            "distance": 8000.0,
            "moving_time": 7200,
            "elapsed_time": 8000,
            "total_elevation_gain": 500.0,
            "sport_type": "Hike",
            "start_date": "2024-05-01T15:00:00Z",
            "start_date_local": "2024-05-01T08:00:00Z",
            "timezone": "(GMT-08:00) America/Los_Angeles",
            "decoded_polyline": [[37.3, -122.2]]
        }))
        .unwrap()
    }

    #[test]
    fn test_list_item_hides_route_by_default() {
        let item = list_item(activity(), false).unwrap();
        assert!(item.get(DECODED_POLYLINE_FIELD).is_none());
        assert_eq!(item["start_date"], "2024-05-01T15:00:00Z");
    }

    #[test]
    fn test_list_item_includes_route_on_request() {
        let item = list_item(activity(), true).unwrap();
        assert_eq!(item[DECODED_POLYLINE_FIELD], json!([[37.3, -122.2]]));
    }

    #[test]
    fn test_list_query_limit_range() {
        let query = |limit| ListQuery {
            limit,
            offset: 0,
            include_polyline: false,
        };

        assert!(query(None).validate().is_ok());
        assert!(query(Some(1)).validate().is_ok());
        assert!(query(Some(1000)).validate().is_ok());
        assert!(query(Some(0)).validate().is_err());
        assert!(query(Some(1001)).validate().is_err());
    }

    #[test]
    fn test_parse_flag_spellings() {
        for raw in ["true", "True", "TRUE", "t", "1", "yes", "Y", "on", "On"] {
            assert_eq!(parse_flag(raw), Some(true), "{}", raw);
        }
        for raw in ["false", "False", "f", "0", "no", "N", "off", "OFF"] {
            assert_eq!(parse_flag(raw), Some(false), "{}", raw);
        }
        for raw in ["", "maybe", "2", "yess"] {
            assert_eq!(parse_flag(raw), None, "{}", raw);
        }
    }
}
