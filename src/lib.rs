// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Covrmmand: see where your team is
//!
//! This crate provides a small dashboard that signs users in with Google,
//! polls the Latitude API for each active user's current location and
//! serves the active users as map markers.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::FirestoreDb;
use services::{GoogleClient, UserService};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: FirestoreDb,
    pub google: GoogleClient,
    pub users: UserService,
}

impl AppState {
    /// Wire up services from configuration and a user store.
    pub fn new(config: Config, db: FirestoreDb) -> Self {
        let google = GoogleClient::new(
            config.google_client_id.clone(),
            config.google_client_secret.clone(),
            config.google_endpoints.clone(),
        );
        let locations = services::LocationService::new(google.clone());
        let users = UserService::new(db.clone(), locations);

        Self {
            config,
            db,
            google,
            users,
        }
    }
}
