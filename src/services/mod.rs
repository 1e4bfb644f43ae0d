// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod google;
pub mod location;
pub mod users;

pub use google::GoogleClient;
pub use location::{LocationError, LocationService};
pub use users::UserService;
