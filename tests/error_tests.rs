// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::http::StatusCode;
use axum::response::IntoResponse;
use strava_mirror::error::AppError;

fn status_of(err: AppError) -> StatusCode {
    err.into_response().status()
}

#[test]
fn test_error_status_mapping() {
    assert_eq!(
        status_of(AppError::NotFound("Activity not found".to_string())),
        StatusCode::NOT_FOUND
    );
    assert_eq!(
        status_of(AppError::Conflict("duplicate".to_string())),
        StatusCode::BAD_REQUEST
    );
    assert_eq!(
        status_of(AppError::Validation("limit".to_string())),
        StatusCode::UNPROCESSABLE_ENTITY
    );
    assert_eq!(
        status_of(AppError::StravaApi("HTTP 500".to_string())),
        StatusCode::BAD_GATEWAY
    );
    assert_eq!(
        status_of(AppError::Database("offline".to_string())),
        StatusCode::INTERNAL_SERVER_ERROR
    );
    assert_eq!(
        status_of(AppError::Internal(anyhow::anyhow!("boom"))),
        StatusCode::INTERNAL_SERVER_ERROR
    );
}
