// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Configuration loaded from environment variables.
//!
//! The API server only needs [`Config`]. The sync process additionally
//! loads [`SyncConfig`], which carries the Strava credentials.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_STRAVA_API_URL: &str = "https://www.strava.com/api/v3";
const DEFAULT_STRAVA_TOKEN_URL: &str = "https://www.strava.com/oauth/token";

/// Settings shared by the API server and the sync process.
#[derive(Debug, Clone)]
pub struct Config {
    /// GCP project holding the Firestore database
    pub gcp_project_id: String,
    /// Firestore collection holding the activities
    pub activities_collection: String,
    /// Server port
    pub port: u16,
    /// Directory for log files; stdout only when unset
    pub log_dir: Option<PathBuf>,
}

impl Config {
    /// Default config for testing only.
    pub fn test_default() -> Self {
        Self {
            gcp_project_id: "test-project".to_string(),
            activities_collection: crate::db::collections::ACTIVITIES.to_string(),
            port: 8080,
            log_dir: None,
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Ok(Self {
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            activities_collection: env::var("ACTIVITIES_COLLECTION")
                .unwrap_or_else(|_| crate::db::collections::ACTIVITIES.to_string()),
            port: parse_or("PORT", 8080)?,
            log_dir: env::var("LOG_DIR")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
        })
    }
}

/// Strava credentials and scheduling for the sync process.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub strava_client_id: String,
    pub strava_client_secret: String,
    /// Long-lived refresh token for the mirrored athlete
    pub strava_refresh_token: String,
    /// Hours to sleep between sync cycles
    pub sync_interval_hours: u64,
    /// Page size for the activity list endpoint
    pub activities_per_page: u32,
    pub strava_api_url: String,
    pub strava_token_url: String,
}

impl SyncConfig {
    /// Default config for testing only.
    pub fn test_default() -> Self {
        Self {
            strava_client_id: "test_client_id".to_string(),
            strava_client_secret: "test_secret".to_string(),
            strava_refresh_token: "test_refresh_token".to_string(),
            sync_interval_hours: 6,
            activities_per_page: 200,
            strava_api_url: DEFAULT_STRAVA_API_URL.to_string(),
            strava_token_url: DEFAULT_STRAVA_TOKEN_URL.to_string(),
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        Ok(Self {
            strava_client_id: required("STRAVA_CLIENT_ID")?,
            strava_client_secret: required("STRAVA_CLIENT_SECRET")?,
            strava_refresh_token: required("STRAVA_REFRESH_TOKEN")?,
            sync_interval_hours: parse_or("SYNC_INTERVAL", 6)?,
            activities_per_page: parse_or("ACTIVITIES_PER_PAGE", 200)?,
            strava_api_url: env::var("STRAVA_API_URL")
                .unwrap_or_else(|_| DEFAULT_STRAVA_API_URL.to_string()),
            strava_token_url: env::var("STRAVA_TOKEN_URL")
                .unwrap_or_else(|_| DEFAULT_STRAVA_TOKEN_URL.to_string()),
        })
    }

    /// Sleep between two sync cycles.
    pub fn sync_interval(&self) -> Duration {
        Duration::from_secs(self.sync_interval_hours * 3600)
    }
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name)
        .map(|v| v.trim().to_string())
        .map_err(|_| ConfigError::Missing(name))
}

fn parse_or<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::Invalid(name, raw)),
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable {0}: {1:?}")]
    Invalid(&'static str, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    // All env manipulation lives in one test so parallel tests don't race.
    #[test]
    fn test_sync_config_from_env() {
        env::set_var("STRAVA_CLIENT_ID", "test_id");
        env::set_var("STRAVA_CLIENT_SECRET", " test_secret\n");
        env::set_var("STRAVA_REFRESH_TOKEN", "test_refresh");
        env::remove_var("SYNC_INTERVAL");
        env::remove_var("ACTIVITIES_PER_PAGE");

        let config = SyncConfig::from_env().expect("Config should load");

        assert_eq!(config.strava_client_id, "test_id");
        assert_eq!(config.strava_client_secret, "test_secret");
        assert_eq!(config.sync_interval_hours, 6);
        assert_eq!(config.sync_interval(), Duration::from_secs(6 * 3600));
        assert_eq!(config.activities_per_page, 200);

        env::set_var("ACTIVITIES_PER_PAGE", "lots");
        let err = SyncConfig::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid("ACTIVITIES_PER_PAGE", _)));
        env::remove_var("ACTIVITIES_PER_PAGE");

        env::remove_var("STRAVA_REFRESH_TOKEN");
        let err = SyncConfig::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::Missing("STRAVA_REFRESH_TOKEN")));
    }
}
