// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Dashboard route tests.
//!
//! These tests verify that:
//! 1. Session routes redirect to sign-in without a valid session
//! 2. The dashboard lists active users with a location
//! 3. Profile updates validate input and re-run the location step

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
};
use chrono::{Duration, Utc};
use covrmmand::middleware::auth::SESSION_COOKIE;
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::MockServer;

mod common;
use common::{create_test_app, create_test_jwt, forbid_location_calls, test_location, test_user};

async fn json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn session_cookie(token: &str) -> String {
    format!("{}={}", SESSION_COOKIE, token)
}

#[tokio::test]
async fn test_dashboard_without_session_redirects_to_sign_in() {
    let server = MockServer::start().await;
    let (app, _) = create_test_app(&server);

    for uri in ["/", "/dashboard"] {
        let response = app
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::SEE_OTHER, "GET {}", uri);
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/auth/google"
        );
    }
}

#[tokio::test]
async fn test_dashboard_with_invalid_token_redirects() {
    let server = MockServer::start().await;
    let (app, _) = create_test_app(&server);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/dashboard")
                .header(header::AUTHORIZATION, "Bearer invalid.token.here")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_dashboard_lists_active_users_with_location() {
    let server = MockServer::start().await;
    let (app, state) = create_test_app(&server);

    let mut me = test_user("me@x.com", "Me", false);
    me.level = Some(2);
    let mut ann = test_user("ann@x.com", "Ann", true);
    ann.level = Some(7);
    ann.location = Some(test_location(Utc::now() - Duration::minutes(10)));
    let bob = test_user("bob@x.com", "Bob", true);

    for user in [&me, &ann, &bob] {
        state.db.upsert_user(user).await.unwrap();
    }

    let token = create_test_jwt(&me.id, &state.config.jwt_signing_key);
    let response = app
        .oneshot(
            Request::builder()
                .uri("/dashboard")
                .header(header::COOKIE, session_cookie(&token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;

    assert_eq!(body["current_user"]["email"], "me@x.com");
    assert_eq!(body["current_user"]["level"], 2);

    let markers = body["markers"].as_array().unwrap();
    assert_eq!(markers.len(), 1);
    assert_eq!(markers[0]["name"], "Ann");
    assert_eq!(markers[0]["level"], 7);
    assert_eq!(markers[0]["latitude"], 37.4);
    assert_eq!(markers[0]["minutes_ago"], 10);
}

#[tokio::test]
async fn test_root_serves_dashboard_with_bearer_token() {
    let server = MockServer::start().await;
    let (app, state) = create_test_app(&server);

    let me = test_user("me@x.com", "Me", false);
    state.db.upsert_user(&me).await.unwrap();
    let token = create_test_jwt(&me.id, &state.config.jwt_signing_key);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/")
                .header(header::AUTHORIZATION, format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["markers"], json!([]));
}

#[tokio::test]
async fn test_update_with_invalid_level_is_rejected() {
    let server = MockServer::start().await;
    let (app, state) = create_test_app(&server);
    forbid_location_calls(&server).await;

    let me = test_user("me@x.com", "Me", false);
    state.db.upsert_user(&me).await.unwrap();
    let token = create_test_jwt(&me.id, &state.config.jwt_signing_key);

    let response = app
        .oneshot(
            Request::builder()
                .method("PATCH")
                .uri("/dashboard")
                .header(header::COOKIE, session_cookie(&token))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"level": 9, "active": true}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = json_body(response).await;
    assert_eq!(body["error"], "validation_error");

    let stored = state.db.get_user(&me.id).await.unwrap().unwrap();
    assert_eq!(stored, me);
}

#[tokio::test]
async fn test_put_deactivates_and_clears_location() {
    let server = MockServer::start().await;
    let (app, state) = create_test_app(&server);
    forbid_location_calls(&server).await;

    let mut me = test_user("me@x.com", "Me", true);
    me.location = Some(test_location(Utc::now()));
    state.db.upsert_user(&me).await.unwrap();
    let token = create_test_jwt(&me.id, &state.config.jwt_signing_key);

    let response = app
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/dashboard")
                .header(header::COOKIE, session_cookie(&token))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"active": false, "name": "Renamed"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["active"], false);
    assert_eq!(body["name"], "Renamed");
    assert_eq!(body["has_location"], false);

    let stored = state.db.get_user(&me.id).await.unwrap().unwrap();
    assert!(stored.location.is_none());
}

#[tokio::test]
async fn test_session_for_deleted_user_is_not_found() {
    let server = MockServer::start().await;
    let (app, state) = create_test_app(&server);

    let token = create_test_jwt("gone", &state.config.jwt_signing_key);
    let response = app
        .oneshot(
            Request::builder()
                .uri("/dashboard")
                .header(header::COOKIE, session_cookie(&token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_public_route_no_auth_required() {
    let server = MockServer::start().await;
    let (app, _) = create_test_app(&server);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}
