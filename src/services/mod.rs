// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod polyline;
pub mod strava;
pub mod sync;
pub mod token;

pub use strava::{StravaActivitySummary, StravaClient};
pub use sync::{SyncService, SyncSummary};
pub use token::TokenManager;
