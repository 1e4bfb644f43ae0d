// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Google API client for OAuth and the Latitude location API.
//!
//! Handles:
//! - Authorization URL construction and code exchange
//! - User email lookup after sign-in
//! - Access token refresh
//! - Current location fetch (best granularity)

use crate::config::GoogleEndpoints;
use crate::error::AppError;
use crate::models::TokenBundle;
use crate::services::location::LocationError;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;

/// Longest access-token lifetime we accept from the token endpoint (1 day).
const MAX_TOKEN_LIFETIME_SECS: i64 = 24 * 60 * 60;

/// Scopes requested at sign-in.
pub const OAUTH_SCOPES: &str =
    "email profile https://www.googleapis.com/auth/latitude.current.best";

/// Google API client.
#[derive(Clone)]
pub struct GoogleClient {
    http: reqwest::Client,
    endpoints: GoogleEndpoints,
    client_id: String,
    client_secret: String,
}

impl GoogleClient {
    /// Create a new Google client with OAuth credentials.
    pub fn new(client_id: String, client_secret: String, endpoints: GoogleEndpoints) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoints,
            client_id,
            client_secret,
        }
    }

    /// Authorization URL for starting the OAuth flow.
    ///
    /// Requests offline access so that Google issues a refresh token.
    pub fn authorize_url(&self, redirect_uri: &str, state: &str) -> String {
        format!(
            "{}?\
             client_id={}&\
             redirect_uri={}&\
             response_type=code&\
             scope={}&\
             access_type=offline&\
             state={}",
            self.endpoints.auth_url,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(redirect_uri),
            urlencoding::encode(OAUTH_SCOPES),
            urlencoding::encode(state),
        )
    }

    /// Exchange an authorization code for tokens.
    pub async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<TokenBundle, AppError> {
        let response = self
            .http
            .post(&self.endpoints.token_url)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("code", code),
                ("redirect_uri", redirect_uri),
                ("grant_type", "authorization_code"),
            ])
            .send()
            .await
            .map_err(|e| AppError::GoogleApi(format!("Token exchange failed: {}", e)))?;

        let token: TokenResponse = self.check_response_json(response).await?;
        token.into_bundle(Utc::now())
    }

    /// Refresh an expired access token.
    pub async fn refresh_access_token(&self, refresh_token: &str) -> Result<TokenBundle, AppError> {
        let response = self
            .http
            .post(&self.endpoints.token_url)
            .form(&[
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
                ("refresh_token", refresh_token),
                ("grant_type", "refresh_token"),
            ])
            .send()
            .await
            .map_err(|e| AppError::GoogleApi(format!("Token refresh request failed: {}", e)))?;

        let token: TokenResponse = self.check_response_json(response).await?;
        token.into_bundle(Utc::now())
    }

    /// Email address of the signed-in user.
    pub async fn get_email(&self, access_token: &str) -> Result<String, AppError> {
        let response = self
            .http
            .get(&self.endpoints.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| AppError::GoogleApi(e.to_string()))?;

        let info: UserInfo = self.check_response_json(response).await?;
        info.email
            .filter(|e| !e.is_empty())
            .ok_or_else(|| AppError::GoogleApi("Google account has no email".to_string()))
    }

    /// Fetch the user's current location at best granularity.
    pub async fn current_location(
        &self,
        access_token: &str,
    ) -> Result<CurrentLocation, LocationError> {
        let response = self
            .http
            .get(&self.endpoints.latitude_url)
            .bearer_auth(access_token)
            .query(&[("granularity", "best")])
            .send()
            .await
            .map_err(|e| LocationError::Transport(e.to_string()))?;

        let status = response.status();
        if status.as_u16() == 401 || status.as_u16() == 403 {
            return Err(LocationError::AuthExpiredOrInvalid(format!("HTTP {}", status)));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LocationError::Transport(format!("HTTP {}: {}", status, body)));
        }

        let body: CurrentLocationResponse = response
            .json()
            .await
            .map_err(|e| LocationError::Malformed(e.to_string()))?;
        Ok(body.data)
    }

    /// Check response and parse JSON body.
    async fn check_response_json<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, AppError> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::GoogleApi(format!("HTTP {}: {}", status, body)));
        }

        response
            .json()
            .await
            .map_err(|e| AppError::GoogleApi(format!("JSON parse error: {}", e)))
    }
}

/// Token endpoint response (code exchange and refresh).
#[derive(Debug, Clone, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    /// Lifetime in seconds; absent for non-expiring tokens
    #[serde(default)]
    expires_in: Option<i64>,
}

impl TokenResponse {
    fn into_bundle(self, now: DateTime<Utc>) -> Result<TokenBundle, AppError> {
        let lifetime = self.expires_in.unwrap_or(0);
        if !(0..=MAX_TOKEN_LIFETIME_SECS).contains(&lifetime) {
            return Err(AppError::GoogleApi(format!(
                "Token lifetime out of range: {}s",
                lifetime
            )));
        }

        let expires_at = Duration::try_seconds(lifetime)
            .and_then(|d| now.checked_add_signed(d))
            .ok_or_else(|| AppError::GoogleApi("Token expiry overflowed".to_string()))?;

        Ok(TokenBundle {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expires_at,
            expires: self.expires_in.is_some(),
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
struct UserInfo {
    #[serde(default)]
    email: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct CurrentLocationResponse {
    data: CurrentLocation,
}

/// Location as reported by the Latitude API.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentLocation {
    pub timestamp_ms: EpochMillis,
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy: f64,
}

/// Milliseconds since the epoch, sent either as a JSON string or number.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum EpochMillis {
    Number(i64),
    Text(String),
}

impl EpochMillis {
    /// Convert to an instant, if the value is a valid timestamp.
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        let millis = match self {
            EpochMillis::Number(ms) => *ms,
            EpochMillis::Text(raw) => raw.trim().parse().ok()?,
        };
        DateTime::from_timestamp_millis(millis)
    }
}
