// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Dashboard routes for signed-in users.

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::{Location, User, UserUpdate};
use crate::time_utils::{format_utc_rfc3339, minutes_since};
use crate::AppState;
use axum::{extract::State, routing::get, Extension, Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

/// Dashboard routes (require a session).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/", get(show)).route(
        "/dashboard",
        get(show).put(update).patch(update),
    )
}

// ─── Responses ───────────────────────────────────────────────

/// Signed-in user's own profile.
#[derive(Serialize)]
pub struct ProfileResponse {
    pub email: String,
    pub name: String,
    pub active: bool,
    pub level: Option<i32>,
    pub has_location: bool,
}

impl From<&User> for ProfileResponse {
    fn from(user: &User) -> Self {
        Self {
            email: user.email.clone(),
            name: user.name.clone(),
            active: user.active,
            level: user.level,
            has_location: user.location.is_some(),
        }
    }
}

/// One active user on the map.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct MapMarker {
    pub name: String,
    pub level: Option<i32>,
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy: f64,
    pub observed_at: String,
    pub minutes_ago: i64,
}

impl MapMarker {
    fn new(user: &User, location: &Location, now: DateTime<Utc>) -> Self {
        Self {
            name: user.name.clone(),
            level: user.level,
            latitude: location.latitude,
            longitude: location.longitude,
            accuracy: location.accuracy,
            observed_at: format_utc_rfc3339(location.timestamp),
            minutes_ago: minutes_since(location.timestamp, now),
        }
    }
}

#[derive(Serialize)]
pub struct DashboardResponse {
    pub current_user: ProfileResponse,
    pub markers: Vec<MapMarker>,
}

// ─── Handlers ────────────────────────────────────────────────

/// Show the dashboard: the current user plus every active user on the map.
async fn show(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<DashboardResponse>> {
    let current_user = state.users.get(&auth.user_id).await?;
    let now = Utc::now();

    let markers: Vec<MapMarker> = state
        .users
        .active_users_with_location()
        .await?
        .iter()
        .map(|(user, location)| MapMarker::new(user, location, now))
        .collect();

    tracing::debug!(
        user_id = %auth.user_id,
        markers = markers.len(),
        "Serving dashboard"
    );

    Ok(Json(DashboardResponse {
        current_user: ProfileResponse::from(&current_user),
        markers,
    }))
}

/// Update the current user's profile.
async fn update(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(changes): Json<UserUpdate>,
) -> Result<Json<ProfileResponse>> {
    let user = state.users.update_user(&auth.user_id, changes).await?;
    Ok(Json(ProfileResponse::from(&user)))
}
