//! Client-side validation rules mirroring the backend's request schemas.
//!
//! These run before a request is sent so the user gets a field-level message
//! without a round trip. The backend remains the authority.

use std::collections::HashMap;
use validator::ValidationError;

/// Minimum password length accepted by the backend.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Webhook secret bounds (HMAC key).
pub const MIN_WEBHOOK_SECRET_LENGTH: usize = 16;
pub const MAX_WEBHOOK_SECRET_LENGTH: usize = 100;

/// Headers a webhook may not override; the delivery worker owns them.
pub const FORBIDDEN_WEBHOOK_HEADERS: &[&str] = &[
    "authorization",
    "content-type",
    "content-length",
    "host",
    "user-agent",
    "x-webhook-signature",
];

/// Characters the backend counts as "special" in passwords.
const PASSWORD_SPECIALS: &str = "!@#$%^&*(),.?\":{}|<>";

lazy_static::lazy_static! {
    static ref TOTP_CODE_REGEX: regex::Regex = regex::Regex::new(r"^\d{6}$").unwrap();
    static ref BACKUP_CODE_REGEX: regex::Regex =
        regex::Regex::new(r"^[A-Z0-9]{4}-?[A-Z0-9]{4}$").unwrap();
    static ref HEADER_NAME_REGEX: regex::Regex =
        regex::Regex::new(r"^[A-Za-z0-9!#$%&'*+.^_`|~-]+$").unwrap();
}

fn error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

/// Validates password strength: length, upper, lower, digit and special.
pub fn validate_password_strength(password: &str) -> Result<(), ValidationError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(error(
            "password_length",
            "Password must be at least 8 characters long",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(error(
            "password_uppercase",
            "Password must contain at least one uppercase letter",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err(error(
            "password_lowercase",
            "Password must contain at least one lowercase letter",
        ));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(error(
            "password_digit",
            "Password must contain at least one digit",
        ));
    }
    if !password.chars().any(|c| PASSWORD_SPECIALS.contains(c)) {
        return Err(error(
            "password_special",
            "Password must contain at least one special character",
        ));
    }
    Ok(())
}

/// Validates a 6-digit TOTP code.
pub fn validate_totp_code(code: &str) -> Result<(), ValidationError> {
    if TOTP_CODE_REGEX.is_match(code) {
        Ok(())
    } else {
        Err(error("totp_code", "Code must be exactly 6 digits"))
    }
}

/// Validates a recovery code (`ABCD-1234`, dash optional).
pub fn validate_backup_code(code: &str) -> Result<(), ValidationError> {
    if BACKUP_CODE_REGEX.is_match(code) {
        Ok(())
    } else {
        Err(error(
            "backup_code",
            "Backup code must be 8 letters or digits, optionally split by a dash",
        ))
    }
}

/// Validates the code of a two-factor login: TOTP, or backup when `is_backup`.
pub fn validate_two_factor_code(code: &str, is_backup: bool) -> Result<(), ValidationError> {
    if is_backup {
        validate_backup_code(code)
    } else {
        validate_totp_code(code)
    }
}

pub fn validate_webhook_secret(secret: &str) -> Result<(), ValidationError> {
    let len = secret.chars().count();
    if (MIN_WEBHOOK_SECRET_LENGTH..=MAX_WEBHOOK_SECRET_LENGTH).contains(&len) {
        Ok(())
    } else {
        Err(error(
            "webhook_secret_length",
            "Secret must be 16-100 characters",
        ))
    }
}

/// Validates custom webhook headers: legal names, none of the reserved ones.
pub fn validate_webhook_headers(headers: &HashMap<String, String>) -> Result<(), ValidationError> {
    for name in headers.keys() {
        if !HEADER_NAME_REGEX.is_match(name) {
            return Err(error("webhook_header_name", "Header name is not a valid token"));
        }
        let lower = name.to_ascii_lowercase();
        if FORBIDDEN_WEBHOOK_HEADERS.contains(&lower.as_str()) {
            let mut err = error(
                "webhook_header_forbidden",
                "Headers cannot override reserved delivery headers",
            );
            err.add_param("header".into(), name);
            return Err(err);
        }
    }
    Ok(())
}

/// Validates that a URL uses the http or https scheme and has a host.
pub fn validate_http_url(url: &str) -> Result<(), ValidationError> {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"));
    match rest {
        Some(rest) if !rest.is_empty() && !rest.starts_with('/') => Ok(()),
        _ => Err(error("http_url", "URL must use http or https")),
    }
}
