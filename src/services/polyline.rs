// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Encoded polyline handling (Strava format, precision 5).
//!
//! Coordinates are exposed as `[latitude, longitude]` pairs, which is the
//! order stored in `decoded_polyline`. The `polyline` crate works in
//! `(x = longitude, y = latitude)` order.

use geo::{Coord, LineString};

/// Strava summary polylines use 5 decimal digits.
const PRECISION: u32 = 5;

/// Decode an encoded polyline into `[lat, lon]` pairs.
///
/// A missing or empty string means the activity has no route and yields
/// `Ok(None)`.
pub fn decode_polyline(encoded: Option<&str>) -> Result<Option<Vec<[f64; 2]>>, PolylineError> {
    let encoded = match encoded {
        Some(s) if !s.is_empty() => s,
        _ => return Ok(None),
    };

    let line = ::polyline::decode_polyline(encoded, PRECISION)
        .map_err(|e| PolylineError::Decode(e.to_string()))?;

    Ok(Some(line.0.into_iter().map(|c| [c.y, c.x]).collect()))
}

/// Encode `[lat, lon]` pairs back into a polyline string.
pub fn encode_polyline(points: &[[f64; 2]]) -> Result<String, PolylineError> {
    let line: LineString<f64> = points
        .iter()
        .map(|&[lat, lon]| Coord { x: lon, y: lat })
        .collect();

    ::polyline::encode_coordinates(line, PRECISION).map_err(|e| PolylineError::Encode(e.to_string()))
}

/// Errors from polyline operations.
#[derive(Debug, thiserror::Error)]
pub enum PolylineError {
    #[error("Failed to decode polyline: {0}")]
    Decode(String),

    #[error("Failed to encode polyline: {0}")]
    Encode(String),
}
