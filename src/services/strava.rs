// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Strava API client for the mirror.
//!
//! Handles:
//! - Access token refresh from the long-lived refresh token
//! - Paginated listing of the athlete's activities
//! - Typed view over the loosely-typed activity payloads

use crate::error::AppError;
use serde::Deserialize;
use serde_json::{Map, Value};

/// Strava API client.
#[derive(Clone)]
pub struct StravaClient {
    http: reqwest::Client,
    base_url: String,
    token_url: String,
    client_id: String,
    client_secret: String,
}

impl StravaClient {
    /// Create a new Strava client with OAuth credentials.
    pub fn new(
        base_url: impl Into<String>,
        token_url: impl Into<String>,
        client_id: String,
        client_secret: String,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token_url: token_url.into(),
            client_id,
            client_secret,
        }
    }

    /// List one page of the authenticated athlete's activities, most recent first.
    ///
    /// Records are returned untouched so the raw payload can be stored.
    pub async fn list_activities(
        &self,
        access_token: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<Value>, AppError> {
        let url = format!("{}/athlete/activities", self.base_url);

        let response = self
            .http
            .get(&url)
            .bearer_auth(access_token)
            .query(&[("page", page.to_string()), ("per_page", per_page.to_string())])
            .send()
            .await
            .map_err(|e| AppError::StravaApi(e.to_string()))?;

        self.check_response_json(response).await
    }

    /// Exchange the refresh token for a fresh access token.
    pub async fn refresh_token(
        &self,
        refresh_token: &str,
    ) -> Result<TokenRefreshResponse, AppError> {
        let response = self
            .http
            .post(&self.token_url)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await
            .map_err(|e| AppError::StravaApi(format!("Token refresh request failed: {}", e)))?;

        self.check_response_json(response).await
    }

    /// Check response and parse JSON body.
    async fn check_response_json<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, AppError> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();

            if status.as_u16() == 429 {
                tracing::warn!("Strava rate limit hit (429)");
                return Err(AppError::StravaApi(AppError::STRAVA_RATE_LIMIT.to_string()));
            }

            if status.as_u16() == 401 {
                return Err(AppError::StravaApi(
                    AppError::STRAVA_TOKEN_ERROR.to_string(),
                ));
            }

            return Err(AppError::StravaApi(format!("HTTP {}: {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::StravaApi(format!("JSON parse error: {}", e)))
    }
}

/// Token refresh response from Strava.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenRefreshResponse {
    pub access_token: String,
    /// Strava may rotate the refresh token on any refresh.
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub expires_at: Option<i64>,
}

/// Summary activity from the list endpoint.
///
/// Identity, name, type and both timestamps are required. Descriptive
/// numbers default to zero and metrics to `None` when Strava omits them.
#[derive(Debug, Clone, Deserialize)]
pub struct StravaActivitySummary {
    pub id: u64,
    pub name: String,
    #[serde(rename = "type")]
    pub activity_type: String,
    #[serde(default)]
    pub sport_type: Option<String>,
    #[serde(default)]
    pub distance: f64,
    #[serde(default)]
    pub moving_time: i64,
    #[serde(default)]
    pub elapsed_time: i64,
    #[serde(default)]
    pub total_elevation_gain: f64,
    pub start_date: String,
    pub start_date_local: String,
    #[serde(default)]
    pub timezone: String,
    #[serde(default)]
    pub map: Option<Map<String, Value>>,
    #[serde(default)]
    pub gear: Option<Value>,
    #[serde(default)]
    pub gear_id: Option<String>,
    #[serde(default)]
    pub average_speed: Option<f64>,
    #[serde(default)]
    pub max_speed: Option<f64>,
    #[serde(default)]
    pub average_cadence: Option<f64>,
    #[serde(default)]
    pub average_heartrate: Option<f64>,
    #[serde(default)]
    pub max_heartrate: Option<f64>,
    #[serde(default)]
    pub calories: Option<f64>,
}

impl StravaActivitySummary {
    /// Encoded summary polyline, if the activity recorded a route.
    pub fn summary_polyline(&self) -> Option<&str> {
        self.map
            .as_ref()
            .and_then(|m| m.get("summary_polyline"))
            .and_then(Value::as_str)
    }

    /// Sport type, falling back to the legacy activity type.
    pub fn sport_type(&self) -> &str {
        self.sport_type.as_deref().unwrap_or(&self.activity_type)
    }

    /// Gear reference: the embedded gear object if present, else the bare gear ID.
    pub fn gear(&self) -> Option<Value> {
        self.gear
            .clone()
            .or_else(|| self.gear_id.clone().map(Value::String))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_summary_defaults_for_missing_fields() {
        let summary: StravaActivitySummary = serde_json::from_value(json!({
            "id": 42,
            "name": "Lunch Walk",
            "type": "Walk",
            "start_date": "2024-03-09T20:00:00Z",
            "start_date_local": "2024-03-09T12:00:00Z"
        }))
        .unwrap();

        assert_eq!(summary.distance, 0.0);
        assert_eq!(summary.sport_type(), "Walk");
        assert!(summary.summary_polyline().is_none());
        assert!(summary.average_heartrate.is_none());
        assert!(summary.gear().is_none());
    }

    #[test]
    fn test_summary_polyline_and_gear_id() {
        let summary: StravaActivitySummary = serde_json::from_value(json!({
            "id": 42,
            "name": "Evening Ride",
            "type": "Ride",
            "sport_type": "GravelRide",
            "start_date": "2024-03-09T20:00:00Z",
            "start_date_local": "2024-03-09T12:00:00Z",
            "map": { "id": "a42", "summary_polyline": "_p~iF~ps|U", "resource_state": 2 },
            "gear_id": "b1234"
        }))
        .unwrap();

        assert_eq!(summary.summary_polyline(), Some("_p~iF~ps|U"));
        assert_eq!(summary.sport_type(), "GravelRide");
        assert_eq!(summary.gear(), Some(json!("b1234")));
    }

    #[test]
    fn test_summary_requires_identity() {
        let result = serde_json::from_value::<StravaActivitySummary>(json!({
            "name": "No ID",
            "type": "Run",
            "start_date": "2024-03-09T20:00:00Z",
            "start_date_local": "2024-03-09T12:00:00Z"
        }));
        assert!(result.is_err());
    }
}
