use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ids::UserId;

/// Name shown when neither a profile name nor an email is available.
pub const FALLBACK_DISPLAY_NAME: &str = "User";

/// Optional per-user details, created empty on sign-up.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub display_name: Option<String>,
    pub bio: Option<String>,
}

/// Mirrored user record: identity, login bookkeeping and profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: UserId,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
    pub profile: Profile,
}

impl UserRecord {
    /// A freshly signed-up user with an empty profile.
    #[must_use]
    pub fn new(id: UserId, email: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            email: email.into(),
            created_at,
            last_login: None,
            profile: Profile::default(),
        }
    }

    #[must_use]
    pub fn display_name(&self) -> String {
        self.profile
            .display_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map_or_else(|| display_name_from_email(&self.email), str::to_owned)
    }
}

/// Local part of an email, or the fallback name when there is none.
#[must_use]
pub fn display_name_from_email(email: &str) -> String {
    email
        .split('@')
        .next()
        .map(str::trim)
        .filter(|local| !local.is_empty())
        .unwrap_or(FALLBACK_DISPLAY_NAME)
        .to_owned()
}

/// An authenticated session issued by password sign-in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    pub token: String,
    pub user_id: UserId,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl AuthSession {
    #[must_use]
    pub fn display_name(&self) -> String {
        display_name_from_email(&self.email)
    }
}
