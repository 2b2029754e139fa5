//! Self-service profile models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::Patch;
use validator::Validate;

/// The signed-in user's profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: String,
    pub email: String,
    pub full_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    pub is_active: bool,
    pub is_verified: bool,
    pub roles: Vec<String>,
    #[serde(with = "shared::iso8601")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "shared::iso8601")]
    pub updated_at: DateTime<Utc>,
    #[serde(
        default,
        with = "shared::iso8601::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_login: Option<DateTime<Utc>>,
}

/// Request payload for updating the profile.
///
/// `phone_number` and `bio` distinguish "leave unchanged" (unset) from
/// "clear" (null).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct UpdateProfileRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 2, max = 100, message = "Full name must be 2-100 characters"))]
    pub full_name: Option<String>,

    #[serde(default, skip_serializing_if = "Patch::is_unset")]
    pub phone_number: Patch<String>,

    #[serde(default, skip_serializing_if = "Patch::is_unset")]
    pub bio: Patch<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(url(message = "Invalid avatar URL"))]
    pub avatar_url: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 64, message = "Timezone must be 1-64 characters"))]
    pub timezone: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 2, max = 10, message = "Language must be 2-10 characters"))]
    pub language: Option<String>,
}

impl UpdateProfileRequest {
    /// True when the request would not change anything.
    pub fn is_empty(&self) -> bool {
        self.full_name.is_none()
            && self.phone_number.is_unset()
            && self.bio.is_unset()
            && self.avatar_url.is_none()
            && self.timezone.is_none()
            && self.language.is_none()
    }

    /// Applies the request to a profile, producing the expected result.
    pub fn apply_to(&self, profile: &Profile) -> Profile {
        Profile {
            full_name: self
                .full_name
                .clone()
                .unwrap_or_else(|| profile.full_name.clone()),
            phone_number: self.phone_number.clone().apply(profile.phone_number.clone()),
            bio: self.bio.clone().apply(profile.bio.clone()),
            avatar_url: self.avatar_url.clone().or_else(|| profile.avatar_url.clone()),
            timezone: self.timezone.clone().or_else(|| profile.timezone.clone()),
            language: self.language.clone().or_else(|| profile.language.clone()),
            ..profile.clone()
        }
    }
}

fn default_true() -> bool {
    true
}

/// Notification channels the user has opted into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPreferences {
    #[serde(default = "default_true")]
    pub email_notifications: bool,
    #[serde(default = "default_true")]
    pub security_alerts: bool,
    #[serde(default = "default_true")]
    pub login_alerts: bool,
    #[serde(default)]
    pub marketing_emails: bool,
    #[serde(default)]
    pub weekly_digest: bool,
}

impl Default for NotificationPreferences {
    fn default() -> Self {
        Self {
            email_notifications: true,
            security_alerts: true,
            login_alerts: true,
            marketing_emails: false,
            weekly_digest: false,
        }
    }
}
