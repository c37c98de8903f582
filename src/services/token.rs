// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! In-memory bearer token for the mirrored athlete.

use crate::error::AppError;
use crate::services::strava::StravaClient;
use chrono::{DateTime, Duration, Utc};

/// Margin before token expiration when we proactively refresh (5 minutes).
const TOKEN_REFRESH_MARGIN_SECS: i64 = 5 * 60;

/// Current access token with expiry information.
#[derive(Debug, Clone)]
pub struct AccessToken {
    pub access_token: String,
    /// `None` when Strava did not report an expiry.
    pub expires_at: Option<DateTime<Utc>>,
}

/// Owns the refresh secret and the current access token.
///
/// Held exclusively by the sync service; no locking.
pub struct TokenManager {
    client: StravaClient,
    refresh_token: String,
    current: Option<AccessToken>,
}

impl TokenManager {
    pub fn new(client: StravaClient, refresh_token: String) -> Self {
        Self {
            client,
            refresh_token,
            current: None,
        }
    }

    /// Exchange the refresh token for a new access token.
    ///
    /// On failure the previous token (if any) is kept, and the error is
    /// returned for the caller to treat as fatal.
    pub async fn refresh(&mut self) -> Result<&str, AppError> {
        tracing::info!("Refreshing access token");

        let response = match self.client.refresh_token(&self.refresh_token).await {
            Ok(r) => r,
            Err(e) => {
                tracing::error!(error = %e, "Error refreshing token");
                return Err(e);
            }
        };

        if let Some(rotated) = response.refresh_token {
            if rotated != self.refresh_token {
                tracing::info!("Strava rotated the refresh token");
                self.refresh_token = rotated;
            }
        }

        let expires_at = response
            .expires_at
            .and_then(|ts| DateTime::from_timestamp(ts, 0));

        tracing::info!(expires_at = ?expires_at, "Access token refreshed successfully");

        let token = self.current.insert(AccessToken {
            access_token: response.access_token,
            expires_at,
        });
        Ok(&token.access_token)
    }

    /// The current access token, if one has been obtained.
    pub fn access_token(&self) -> Option<&str> {
        self.current.as_ref().map(|t| t.access_token.as_str())
    }

    /// The refresh token that will be used for the next refresh.
    pub fn refresh_secret(&self) -> &str {
        &self.refresh_token
    }

    /// True if there is no token or it expires within the refresh margin.
    pub fn is_expiring(&self) -> bool {
        match &self.current {
            None => true,
            Some(AccessToken {
                expires_at: Some(expires_at),
                ..
            }) => Utc::now() + Duration::seconds(TOKEN_REFRESH_MARGIN_SECS) >= *expires_at,
            Some(AccessToken {
                expires_at: None, ..
            }) => false,
        }
    }
}
