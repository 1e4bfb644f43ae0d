// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User write path, OAuth provisioning and dashboard queries.

use crate::db::FirestoreDb;
use crate::error::{AppError, Result};
use crate::models::{Credential, Location, TokenBundle, User, UserUpdate};
use crate::services::LocationService;
use validator::Validate;

/// High-level user operations.
///
/// Every save goes through [`UserService::save`], which validates the user
/// and runs the location pre-persist step before writing.
#[derive(Clone)]
pub struct UserService {
    db: FirestoreDb,
    locations: LocationService,
}

impl UserService {
    pub fn new(db: FirestoreDb, locations: LocationService) -> Self {
        Self { db, locations }
    }

    /// Validate, refresh or clear the location, then persist.
    ///
    /// Nothing is written (and no location call is made) if validation fails.
    pub async fn save(&self, user: &mut User) -> Result<()> {
        user.validate()?;
        self.locations.prepare_for_save(user).await;
        self.db.upsert_user(user).await
    }

    /// Get a user by ID.
    pub async fn get(&self, user_id: &str) -> Result<User> {
        self.db
            .get_user(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {} not found", user_id)))
    }

    /// Look up the user for a Google sign-in, creating it if needed, and
    /// store the freshly issued credential.
    ///
    /// A missing or empty refresh token in `tokens` keeps the stored one.
    /// Storing the credential does not trigger a location refresh.
    pub async fn find_or_create_for_oauth(&self, email: &str, tokens: &TokenBundle) -> Result<User> {
        let mut user = match self.db.find_user_by_email(email).await? {
            Some(user) => user,
            None => {
                let mut user = User::new(email);
                self.save(&mut user).await?;
                tracing::info!(email, user_id = %user.id, "Created user");
                user
            }
        };

        user.credential = Some(Credential::from_bundle(tokens, user.credential.as_ref()));
        self.db.upsert_user(&user).await?;

        tracing::info!(
            email,
            user_id = %user.id,
            has_refresh_token = user.credential.as_ref().and_then(|c| c.refresh_token()).is_some(),
            "Stored OAuth credential"
        );

        Ok(user)
    }

    /// Apply a profile update and save the user.
    pub async fn update_user(&self, user_id: &str, update: UserUpdate) -> Result<User> {
        let mut user = self.get(user_id).await?;
        user.apply(update);
        self.save(&mut user).await?;

        tracing::info!(
            email = %user.email,
            active = user.active,
            level = ?user.level,
            "Profile updated"
        );

        Ok(user)
    }

    /// Active users that currently have a location, ordered by name then email.
    pub async fn active_users_with_location(&self) -> Result<Vec<(User, Location)>> {
        let mut pairs: Vec<(User, Location)> = self
            .db
            .list_active_users()
            .await?
            .into_iter()
            .filter_map(|user| {
                let location = user.location.clone()?;
                Some((user, location))
            })
            .collect();

        pairs.sort_by(|(a, _), (b, _)| a.name.cmp(&b.name).then_with(|| a.email.cmp(&b.email)));
        Ok(pairs)
    }
}
