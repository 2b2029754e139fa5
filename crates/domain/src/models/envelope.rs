//! Standard response envelope.
//!
//! Most backend endpoints wrap their payload as
//! `{"success": bool, "data": T?, "error": {...}?, "metadata": {...}?}`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::codec::JsonValue;
use crate::labels::WireEnum;

wire_enum! {
    /// Error identifiers the backend puts in `error.code`.
    pub enum ErrorCode {
        NetworkError => ("NETWORK_ERROR", "Network error"),
        TimeoutError => ("TIMEOUT_ERROR", "Request timed out"),
        InvalidCredentials => ("INVALID_CREDENTIALS", "Invalid email or password"),
        UserNotFound => ("USER_NOT_FOUND", "User not found"),
        EmailAlreadyExists => ("EMAIL_ALREADY_EXISTS", "Email is already registered"),
        AccountLocked => ("ACCOUNT_LOCKED", "Account locked"),
        EmailNotVerified => ("EMAIL_NOT_VERIFIED", "Email not verified"),
        TwoFactorRequired => ("TWO_FACTOR_REQUIRED", "Two-factor verification required"),
        InvalidTwoFactorCode => ("INVALID_TWO_FACTOR_CODE", "Invalid two-factor code"),
        TokenExpired => ("TOKEN_EXPIRED", "Session expired"),
        InvalidToken => ("INVALID_TOKEN", "Invalid token"),
        PermissionDenied => ("PERMISSION_DENIED", "Permission denied"),
        ServerError => ("SERVER_ERROR", "Server error"),
        ValidationError => ("VALIDATION_ERROR", "Validation failed"),
        RateLimitExceeded => ("RATE_LIMIT_EXCEEDED", "Too many requests"),
    }
}

impl ErrorCode {
    /// Whether the error means the stored credentials are no longer usable.
    pub fn requires_reauthentication(&self) -> bool {
        matches!(self, ErrorCode::TokenExpired | ErrorCode::InvalidToken)
    }
}

/// Error block of a failed response.
///
/// `code` stays a raw string so codes added server-side still decode; use
/// [`ApiErrorBody::kind`] to narrow it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorBody {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<JsonValue>,
}

impl ApiErrorBody {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code.as_str().to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn kind(&self) -> Option<ErrorCode> {
        self.code.parse().ok()
    }

    /// Used when a response reports failure without an error block.
    pub fn unspecified() -> Self {
        Self::new(ErrorCode::ServerError, "Request failed without error details")
    }
}

/// Tracking metadata attached to responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMetadata {
    #[serde(
        default,
        with = "shared::iso8601::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(alias = "request_id", skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Response envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiErrorBody>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<ResponseMetadata>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            metadata: None,
        }
    }

    pub fn failure(error: ApiErrorBody) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error),
            metadata: None,
        }
    }

    /// Splits the envelope into its payload or its error block.
    pub fn into_result(self) -> Result<Option<T>, ApiErrorBody> {
        if self.success {
            Ok(self.data)
        } else {
            Err(self.error.unwrap_or_else(ApiErrorBody::unspecified))
        }
    }
}

/// Generic `{"message": "..."}` acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}
