// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! OAuth credential embedded in a user document.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Margin before expiry at which we refresh the access token (1 minute).
const TOKEN_REFRESH_MARGIN_SECS: i64 = 60;

/// Google OAuth tokens for server-to-provider calls on a user's behalf.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Credential {
    /// Access token
    pub token: String,
    /// Refresh token (only issued on offline consent)
    #[serde(default)]
    pub refresh_token: Option<String>,
    /// When the access token expires
    pub expires_at: DateTime<Utc>,
    /// Whether the access token expires at all
    pub expires: bool,
}

/// Token material handed back by the OAuth provider.
#[derive(Debug, Clone)]
pub struct TokenBundle {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub expires: bool,
}

impl Credential {
    /// Build a fresh credential from a token bundle.
    ///
    /// The refresh token of `previous` is carried over unless the bundle
    /// brings a non-empty one of its own.
    pub fn from_bundle(bundle: &TokenBundle, previous: Option<&Credential>) -> Self {
        let refresh_token = match non_empty(bundle.refresh_token.as_deref()) {
            Some(token) => Some(token.to_string()),
            None => previous.and_then(|c| c.refresh_token.clone()),
        };

        Self {
            token: bundle.access_token.clone(),
            refresh_token,
            expires_at: bundle.expires_at,
            expires: bundle.expires,
        }
    }

    /// Usable refresh token, if any.
    pub fn refresh_token(&self) -> Option<&str> {
        non_empty(self.refresh_token.as_deref())
    }

    /// Whether the access token should be refreshed before use at `now`.
    pub fn needs_refresh(&self, now: DateTime<Utc>) -> bool {
        self.expires && now + Duration::seconds(TOKEN_REFRESH_MARGIN_SECS) >= self.expires_at
    }

    /// Apply a token refresh response in place.
    pub fn apply_refresh(&mut self, bundle: &TokenBundle) {
        *self = Self::from_bundle(bundle, Some(&*self));
    }
}

fn non_empty(token: Option<&str>) -> Option<&str> {
    token.filter(|t| !t.trim().is_empty())
}
