// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Location refresh: keeps a user's embedded location in sync with Google.
//!
//! [`LocationService::prepare_for_save`] runs on every user save. Active
//! users get a fresh location fetched from the Latitude API; inactive users
//! lose theirs. Failures are logged and end with no location, never with an
//! error for the caller.

use crate::models::{Location, User};
use crate::services::GoogleClient;
use chrono::{DateTime, Utc};

/// Why a refresh produced no location.
#[derive(Debug, thiserror::Error)]
pub enum LocationError {
    #[error("credential rejected: {0}")]
    AuthExpiredOrInvalid(String),

    #[error("location observed at {observed_at} is stale")]
    Stale { observed_at: DateTime<Utc> },

    #[error("transport failure: {0}")]
    Transport(String),

    #[error("malformed response: {0}")]
    Malformed(String),
}

/// Synchronizes user locations with the Latitude API.
#[derive(Clone)]
pub struct LocationService {
    google: GoogleClient,
}

impl LocationService {
    pub fn new(google: GoogleClient) -> Self {
        Self { google }
    }

    /// Pre-persist step for a user save.
    ///
    /// Must be called right before the user document is written.
    pub async fn prepare_for_save(&self, user: &mut User) {
        if user.active {
            self.refresh_location(user).await;
        } else if user.location.take().is_some() {
            tracing::debug!(email = %user.email, "User inactive, location removed");
        }
    }

    /// Replace the user's location with a fresh one from Google.
    ///
    /// On any failure the existing location is removed. May also update the
    /// user's credential if the access token had to be refreshed.
    pub async fn refresh_location(&self, user: &mut User) -> Option<Location> {
        match self.fetch_location(user, Utc::now()).await {
            Ok(location) => {
                tracing::info!(
                    email = %user.email,
                    observed_at = %location.timestamp,
                    "Location updated"
                );
                user.location = Some(location.clone());
                Some(location)
            }
            Err(LocationError::Stale { observed_at }) => {
                tracing::info!(email = %user.email, %observed_at, "Location stale");
                user.location = None;
                None
            }
            Err(e) => {
                tracing::warn!(email = %user.email, error = %e, "Location update failed");
                user.location = None;
                None
            }
        }
    }

    async fn fetch_location(
        &self,
        user: &mut User,
        now: DateTime<Utc>,
    ) -> Result<Location, LocationError> {
        let credential = user.credential.as_mut().ok_or_else(|| {
            LocationError::AuthExpiredOrInvalid("no credential on file".to_string())
        })?;

        if credential.needs_refresh(now) {
            if let Some(refresh_token) = credential.refresh_token() {
                tracing::info!(email = %user.email, "Access token expired, refreshing");
                let bundle = self
                    .google
                    .refresh_access_token(refresh_token)
                    .await
                    .map_err(|e| LocationError::AuthExpiredOrInvalid(e.to_string()))?;
                credential.apply_refresh(&bundle);
            }
        }

        let current = self.google.current_location(&credential.token).await?;

        let observed_at = current.timestamp_ms.to_datetime().ok_or_else(|| {
            LocationError::Malformed(format!("bad timestampMs: {:?}", current.timestamp_ms))
        })?;

        // Checked against the timestamp just parsed from this response.
        if !Location::is_fresh(observed_at, now) {
            return Err(LocationError::Stale { observed_at });
        }

        Ok(Location {
            timestamp: observed_at,
            latitude: current.latitude,
            longitude: current.longitude,
            accuracy: current.accuracy,
        })
    }
}
