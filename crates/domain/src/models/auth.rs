//! Authentication request and response models.
//!
//! Request bodies use the backend auth schema's snake_case field names.
//! The user record mixes casings exactly as the backend emits it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::validation::{
    validate_password_strength, validate_totp_code, validate_two_factor_code,
};
use std::collections::HashMap;
use validator::{Validate, ValidationError};

/// Login credentials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,

    #[serde(default)]
    pub remember_me: bool,
}

/// Account registration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
#[validate(schema(function = "validate_registration"))]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    #[validate(custom(function = "validate_password_strength"))]
    pub password: String,

    #[validate(length(min = 2, max = 100, message = "Full name must be 2-100 characters"))]
    pub full_name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirm_password: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub agree_to_terms: Option<bool>,
}

impl RegisterRequest {
    /// True when no confirmation was given or it equals the password.
    pub fn passwords_match(&self) -> bool {
        self.confirm_password
            .as_ref()
            .map_or(true, |confirm| confirm == &self.password)
    }
}

fn validate_registration(request: &RegisterRequest) -> Result<(), ValidationError> {
    if request.agree_to_terms == Some(false) {
        let mut err = ValidationError::new("terms_required");
        err.message = Some("You must agree to the terms and conditions".into());
        return Err(err);
    }
    if !request.passwords_match() {
        let mut err = ValidationError::new("password_mismatch");
        err.message = Some("Passwords do not match".into());
        return Err(err);
    }
    Ok(())
}

/// Starts the password reset flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ForgotPasswordRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
}

/// Completes the password reset flow with the emailed token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct ResetPasswordRequest {
    #[validate(length(min = 1, message = "Reset token is required"))]
    pub token: String,

    #[validate(custom(function = "validate_password_strength"))]
    pub new_password: String,

    pub confirm_password: String,
}

impl ResetPasswordRequest {
    pub fn passwords_match(&self) -> bool {
        self.new_password == self.confirm_password
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "snake_case")]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,

    #[validate(custom(function = "validate_password_strength"))]
    pub new_password: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

/// Confirms TOTP enrollment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct TwoFactorVerifyRequest {
    #[validate(custom(function = "validate_totp_code"))]
    pub code: String,
}

/// Second step of a login that returned `requires2fa`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TwoFactorLoginRequest {
    pub temp_token: String,
    pub code: String,
    #[serde(default)]
    pub is_backup: bool,
}

impl Validate for TwoFactorLoginRequest {
    fn validate(&self) -> Result<(), validator::ValidationErrors> {
        let mut errors = validator::ValidationErrors::new();
        if self.temp_token.is_empty() {
            let mut err = ValidationError::new("length");
            err.message = Some("Temporary token is required".into());
            errors.add("temp_token", err);
        }
        if let Err(err) = validate_two_factor_code(&self.code, self.is_backup) {
            errors.add("code", err);
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TwoFactorDisableRequest {
    pub password: String,
}

/// Authenticated user as returned by the auth endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub id: String,
    pub email: String,
    #[serde(rename = "full_name")]
    pub full_name: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
    #[serde(rename = "isEmailVerified")]
    pub email_verified: bool,
    #[serde(rename = "isTwoFactorEnabled")]
    pub two_factor_enabled: bool,
    pub roles: Vec<String>,
    pub permissions: Vec<String>,
    #[serde(with = "shared::iso8601")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "shared::iso8601")]
    pub updated_at: DateTime<Utc>,
    #[serde(
        default,
        with = "shared::iso8601::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_login_at: Option<DateTime<Utc>>,
    #[serde(rename = "is_active")]
    pub is_active: bool,
}

impl AuthUser {
    /// Name to show: display name, then full name, then the email local part.
    pub fn display_name(&self) -> &str {
        if !self.name.trim().is_empty() {
            &self.name
        } else if !self.full_name.trim().is_empty() {
            &self.full_name
        } else {
            self.email.split('@').next().unwrap_or(&self.email)
        }
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.iter().any(|p| p == permission)
    }
}

/// Tokens and user returned by login, registration and 2FA login.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub user: AuthUser,
    pub access_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    pub token_type: String,
    pub expires_in: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requires_2fa: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temp_token: Option<String>,
}

impl AuthResponse {
    /// True when the login must be completed with a [`TwoFactorLoginRequest`].
    pub fn needs_two_factor(&self) -> bool {
        self.requires_2fa.unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRefreshResponse {
    pub access_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    pub token_type: String,
    pub expires_in: i64,
}

/// Material for enrolling an authenticator app.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TwoFactorSetupResponse {
    pub secret: String,
    pub qr_code: String,
    pub backup_codes: Vec<String>,
    pub manual_entry_key: String,
    pub manual_entry_uri: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TwoFactorStatus {
    pub enabled: bool,
    #[serde(
        default,
        with = "shared::iso8601::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub verified_at: Option<DateTime<Utc>>,
    pub backup_codes_remaining: u32,
    pub methods: HashMap<String, bool>,
}
