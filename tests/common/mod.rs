// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use chrono::{DateTime, Duration, Utc};
use covrmmand::config::{Config, GoogleEndpoints};
use covrmmand::db::FirestoreDb;
use covrmmand::models::{Credential, Location, User};
use covrmmand::routes::create_router;
use covrmmand::AppState;
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Path of the mocked Latitude endpoint under the mock server.
#[allow(dead_code)]
pub const LATITUDE_PATH: &str = "/latitude/v1/currentLocation";

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Test config with every Google endpoint pointing at the mock server.
#[allow(dead_code)]
pub fn test_config(server: &MockServer) -> Config {
    Config {
        google_endpoints: GoogleEndpoints::with_base_url(&server.uri()),
        ..Config::default()
    }
}

/// Create a test app backed by the in-memory store and a mock Google.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app(server: &MockServer) -> (axum::Router, Arc<AppState>) {
    let state = Arc::new(AppState::new(
        test_config(server),
        FirestoreDb::new_in_memory(),
    ));
    (create_router(state.clone()), state)
}

/// Create a session token for a user.
#[allow(dead_code)]
pub fn create_test_jwt(user_id: &str, signing_key: &[u8]) -> String {
    covrmmand::middleware::auth::create_jwt(user_id, signing_key).unwrap()
}

/// A valid, non-expired credential.
#[allow(dead_code)]
pub fn test_credential(token: &str) -> Credential {
    Credential {
        token: token.to_string(),
        refresh_token: Some("refresh-token".to_string()),
        expires_at: Utc::now() + Duration::hours(1),
        expires: true,
    }
}

/// User with a credential, active or not.
#[allow(dead_code)]
pub fn test_user(email: &str, name: &str, active: bool) -> User {
    let mut user = User::new(email);
    user.name = name.to_string();
    user.active = active;
    user.credential = Some(test_credential("access-token"));
    user
}

#[allow(dead_code)]
pub fn test_location(observed_at: DateTime<Utc>) -> Location {
    Location {
        timestamp: observed_at,
        latitude: 37.4,
        longitude: -122.1,
        accuracy: 50.0,
    }
}

/// Latitude API body for a location observation.
#[allow(dead_code)]
pub fn location_body(
    observed_at: DateTime<Utc>,
    latitude: f64,
    longitude: f64,
    accuracy: f64,
) -> serde_json::Value {
    json!({
        "data": {
            "kind": "latitude#location",
            "timestampMs": observed_at.timestamp_millis().to_string(),
            "latitude": latitude,
            "longitude": longitude,
            "accuracy": accuracy
        }
    })
}

/// Mount a Latitude response for `token`, expecting exactly `calls` requests.
#[allow(dead_code)]
pub async fn mount_location(
    server: &MockServer,
    token: &str,
    response: ResponseTemplate,
    calls: u64,
) {
    Mock::given(method("GET"))
        .and(path(LATITUDE_PATH))
        .and(query_param("granularity", "best"))
        .and(header("authorization", format!("Bearer {}", token).as_str()))
        .respond_with(response)
        .expect(calls)
        .mount(server)
        .await;
}

/// Fail the test if the Latitude API is called at all.
#[allow(dead_code)]
pub async fn forbid_location_calls(server: &MockServer) {
    Mock::given(path(LATITUDE_PATH))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(server)
        .await;
}
