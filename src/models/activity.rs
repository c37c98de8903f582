// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Strava activity model for storage and API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Activity as accepted and returned by the HTTP API.
///
/// Required fields are enforced by deserialization; everything optional
/// defaults to `None` when absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    /// Strava activity ID
    pub id: u64,
    pub name: String,
    /// Activity type (Ride, Run, ...)
    #[serde(rename = "type")]
    pub activity_type: String,
    /// Distance in meters
    pub distance: f64,
    /// Moving time in seconds
    pub moving_time: i64,
    /// Elapsed time in seconds
    pub elapsed_time: i64,
    /// Elevation gain in meters
    pub total_elevation_gain: f64,
    pub sport_type: String,
    /// Start time (UTC)
    pub start_date: DateTime<Utc>,
    /// Start time in the athlete's local timezone
    pub start_date_local: DateTime<Utc>,
    pub timezone: String,
    #[serde(default)]
    pub map: Option<Map<String, Value>>,
    /// Raw encoded summary polyline
    #[serde(default)]
    pub polyline: Option<String>,
    /// Decoded route as `[lat, lon]` pairs
    #[serde(default)]
    pub decoded_polyline: Option<Vec<[f64; 2]>>,
    #[serde(default)]
    pub average_speed: Option<f64>,
    #[serde(default)]
    pub max_speed: Option<f64>,
    #[serde(default)]
    pub average_heartrate: Option<f64>,
    #[serde(default)]
    pub max_heartrate: Option<f64>,
    #[serde(default)]
    pub average_cadence: Option<f64>,
    #[serde(default)]
    pub calories: Option<f64>,
    #[serde(default)]
    pub gear: Option<Value>,
    #[serde(default)]
    pub photos: Option<Vec<String>>,
}

/// A single route point as stored in Firestore.
///
/// Firestore arrays cannot nest arrays, so pairs are stored as maps.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoutePoint {
    pub lat: f64,
    pub lon: f64,
}

/// Stored activity document in Firestore (document ID is the Strava ID).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityDocument {
    /// Firestore document ID, filled in on reads and never written back
    #[serde(alias = "_firestore_id", default, skip_serializing)]
    pub doc_id: Option<String>,
    pub id: u64,
    pub name: String,
    #[serde(rename = "type")]
    pub activity_type: String,
    pub distance: f64,
    pub moving_time: i64,
    pub elapsed_time: i64,
    pub total_elevation_gain: f64,
    pub sport_type: String,
    #[serde(with = "firestore::serialize_as_timestamp")]
    pub start_date: DateTime<Utc>,
    #[serde(with = "firestore::serialize_as_timestamp")]
    pub start_date_local: DateTime<Utc>,
    pub timezone: String,
    pub map: Option<Map<String, Value>>,
    pub polyline: Option<String>,
    pub decoded_polyline: Option<Vec<RoutePoint>>,
    pub average_speed: Option<f64>,
    pub max_speed: Option<f64>,
    pub average_heartrate: Option<f64>,
    pub max_heartrate: Option<f64>,
    pub average_cadence: Option<f64>,
    pub calories: Option<f64>,
    pub gear: Option<Value>,
    #[serde(default)]
    pub photos: Option<Vec<String>>,
    /// Untouched upstream payload (sync only)
    #[serde(default)]
    pub raw_data: Option<Value>,
}

impl ActivityDocument {
    /// Firestore document ID for an activity.
    pub fn document_id(id: u64) -> String {
        id.to_string()
    }
}

impl From<Activity> for ActivityDocument {
    fn from(a: Activity) -> Self {
        Self {
            doc_id: None,
            id: a.id,
            name: a.name,
            activity_type: a.activity_type,
            distance: a.distance,
            moving_time: a.moving_time,
            elapsed_time: a.elapsed_time,
            total_elevation_gain: a.total_elevation_gain,
            sport_type: a.sport_type,
            start_date: a.start_date,
            start_date_local: a.start_date_local,
            timezone: a.timezone,
            map: a.map,
            polyline: a.polyline,
            decoded_polyline: a.decoded_polyline.map(|points| {
                points
                    .into_iter()
                    .map(|[lat, lon]| RoutePoint { lat, lon })
                    .collect()
            }),
            average_speed: a.average_speed,
            max_speed: a.max_speed,
            average_heartrate: a.average_heartrate,
            max_heartrate: a.max_heartrate,
            average_cadence: a.average_cadence,
            calories: a.calories,
            gear: a.gear,
            photos: a.photos,
            raw_data: None,
        }
    }
}

impl From<ActivityDocument> for Activity {
    /// Drops the storage identifier and the raw upstream payload.
    fn from(d: ActivityDocument) -> Self {
        Self {
            id: d.id,
            name: d.name,
            activity_type: d.activity_type,
            distance: d.distance,
            moving_time: d.moving_time,
            elapsed_time: d.elapsed_time,
            total_elevation_gain: d.total_elevation_gain,
            sport_type: d.sport_type,
            start_date: d.start_date,
            start_date_local: d.start_date_local,
            timezone: d.timezone,
            map: d.map,
            polyline: d.polyline,
            decoded_polyline: d
                .decoded_polyline
                .map(|points| points.into_iter().map(|p| [p.lat, p.lon]).collect()),
            average_speed: d.average_speed,
            max_speed: d.max_speed,
            average_heartrate: d.average_heartrate,
            max_heartrate: d.max_heartrate,
            average_cadence: d.average_cadence,
            calories: d.calories,
            gear: d.gear,
            photos: d.photos,
        }
    }
}
