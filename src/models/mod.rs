// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod credential;
pub mod location;
pub mod user;

pub use credential::{Credential, TokenBundle};
pub use location::Location;
pub use user::{User, UserUpdate};
