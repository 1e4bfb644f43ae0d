// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Last-known location embedded in a user document.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// How old a reported location may be before it is discarded.
pub const STALENESS_WINDOW_SECS: i64 = 60 * 60;

/// A location observation reported by the Latitude API.
///
/// Locations are never edited in place: a successful refresh replaces the
/// whole value and every failed one removes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    /// When the device reported this position (not when we fetched it)
    pub timestamp: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
    /// Accuracy radius in meters
    pub accuracy: f64,
}

impl Location {
    /// Whether an observation made at `timestamp` is still usable at `now`.
    ///
    /// The observation must be strictly newer than `now` minus the
    /// staleness window.
    pub fn is_fresh(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        timestamp > now - Duration::seconds(STALENESS_WINDOW_SECS)
    }
}
