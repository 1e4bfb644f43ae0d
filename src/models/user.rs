//! User model for storage and API.

use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

use crate::models::{Credential, Location};

/// User document stored in Firestore.
///
/// Credential and location are embedded and go away with the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct User {
    /// Opaque document ID (stable across email changes)
    pub id: String,
    /// Email address reported by Google at sign-in
    #[validate(length(min = 1, message = "Email can't be blank"))]
    pub email: String,
    /// Display name shown on the map
    #[serde(default)]
    pub name: String,
    /// Whether this user is tracked and shown on the dashboard
    #[serde(default)]
    pub active: bool,
    /// Level shown on the map marker
    #[validate(range(min = 1, max = 8, message = "Level must be between 1 and 8"))]
    #[serde(default)]
    pub level: Option<i32>,
    #[serde(default)]
    pub credential: Option<Credential>,
    #[serde(default)]
    pub location: Option<Location>,
}

impl User {
    /// New inactive user with a freshly generated ID.
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            email: email.into(),
            name: String::new(),
            active: false,
            level: None,
            credential: None,
            location: None,
        }
    }

    /// Apply the user-editable attributes of a profile update.
    pub fn apply(&mut self, update: UserUpdate) {
        if let Some(email) = update.email {
            self.email = email.trim().to_string();
        }
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(active) = update.active {
            self.active = active;
        }
        if let Some(level) = update.level {
            self.level = level;
        }
    }
}

/// Profile changes submitted from the dashboard.
///
/// Only these attributes can be changed by the user; anything else in the
/// request body is ignored.
#[derive(Debug, Default, Deserialize)]
pub struct UserUpdate {
    pub email: Option<String>,
    pub name: Option<String>,
    pub active: Option<bool>,
    /// `null` clears the level, absence leaves it alone
    #[serde(default, deserialize_with = "deserialize_nullable")]
    pub level: Option<Option<i32>>,
}

fn deserialize_nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_user_is_valid_and_inactive() {
        let user = User::new("a@x.com");
        assert!(user.validate().is_ok());
        assert!(!user.active);
        assert!(user.location.is_none());
    }

    #[test]
    fn test_level_range() {
        let mut user = User::new("a@x.com");

        for level in [1, 4, 8] {
            user.level = Some(level);
            assert!(user.validate().is_ok(), "level {} should be valid", level);
        }
        for level in [0, 9, -1] {
            user.level = Some(level);
            assert!(user.validate().is_err(), "level {} should be invalid", level);
        }

        user.level = None;
        assert!(user.validate().is_ok());
    }

    #[test]
    fn test_blank_email_is_invalid() {
        let mut user = User::new("a@x.com");
        user.apply(UserUpdate {
            email: Some("   ".to_string()),
            ..Default::default()
        });

        let errors = user.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));
    }

    #[test]
    fn test_update_ignores_unknown_attributes() {
        let update: UserUpdate = serde_json::from_str(
            r#"{"name": "Ann", "credential": {"token": "x"}, "location": null}"#,
        )
        .unwrap();

        let mut user = User::new("a@x.com");
        user.apply(update);

        assert_eq!(user.name, "Ann");
        assert!(user.credential.is_none());
    }

    #[test]
    fn test_update_level_null_clears() {
        let mut user = User::new("a@x.com");
        user.level = Some(3);

        let update: UserUpdate = serde_json::from_str(r#"{"active": true}"#).unwrap();
        user.apply(update);
        assert_eq!(user.level, Some(3));
        assert!(user.active);

        let update: UserUpdate = serde_json::from_str(r#"{"level": null}"#).unwrap();
        user.apply(update);
        assert_eq!(user.level, None);

        let update: UserUpdate = serde_json::from_str(r#"{"level": 5}"#).unwrap();
        user.apply(update);
        assert_eq!(user.level, Some(5));
    }
}
