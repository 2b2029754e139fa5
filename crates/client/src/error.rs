use domain::models::envelope::{ApiErrorBody, ErrorCode};
use domain::{JsonValue, WireError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error ({status}) {code}: {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
        details: Option<JsonValue>,
    },

    #[error(transparent)]
    Wire(#[from] WireError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        details: Vec<ValidationDetail>,
    },

    #[error("Not authenticated: no access token set")]
    MissingAccessToken,

    #[error("Response from {path} carried no data")]
    EmptyResponse { path: String },
}

pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationDetail {
    pub field: String,
    pub message: String,
}

impl ClientError {
    /// HTTP status of an API error.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Http(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Backend error code of an API error, when it is a known one.
    pub fn error_code(&self) -> Option<ErrorCode> {
        match self {
            ClientError::Api { code, .. } => code.parse().ok(),
            _ => None,
        }
    }

    /// Whether the caller has to sign in again.
    pub fn requires_reauthentication(&self) -> bool {
        match self {
            ClientError::MissingAccessToken => true,
            ClientError::Api { status: 401, .. } => true,
            _ => self
                .error_code()
                .is_some_and(|code| code.requires_reauthentication()),
        }
    }

    pub(crate) fn from_error_body(status: u16, body: ApiErrorBody) -> Self {
        ClientError::Api {
            status,
            code: body.code,
            message: body.message,
            details: body.details,
        }
    }

    /// Maps a non-success response body to an API error.
    ///
    /// Understands the envelope `error` block, the `{error, message}` shape
    /// and `{detail}` bodies; anything else becomes the raw text.
    pub(crate) fn from_response_body(status: u16, raw: &str) -> Self {
        let fallback_code = fallback_code(status);
        let Ok(json) = serde_json::from_str::<JsonValue>(raw) else {
            let message = if raw.trim().is_empty() {
                format!("Request failed with status {status}")
            } else {
                raw.trim().to_string()
            };
            return ClientError::Api {
                status,
                code: fallback_code.to_string(),
                message,
                details: None,
            };
        };

        if let Some(error) = json.get("error").filter(|e| e.is_object()) {
            if let Ok(body) = serde_json::from_value::<ApiErrorBody>(error.clone()) {
                return Self::from_error_body(status, body);
            }
        }

        if let (Some(code), Some(message)) = (
            json.get("error").and_then(JsonValue::as_str),
            json.get("message").and_then(JsonValue::as_str),
        ) {
            return ClientError::Api {
                status,
                code: code.to_string(),
                message: message.to_string(),
                details: json.get("details").cloned(),
            };
        }

        match json.get("detail") {
            Some(JsonValue::String(message)) => ClientError::Api {
                status,
                code: fallback_code.to_string(),
                message: message.clone(),
                details: None,
            },
            Some(detail) => ClientError::Api {
                status,
                code: ErrorCode::ValidationError.to_string(),
                message: "Request validation failed".to_string(),
                details: Some(detail.clone()),
            },
            None => ClientError::Api {
                status,
                code: fallback_code.to_string(),
                message: format!("Request failed with status {status}"),
                details: Some(json),
            },
        }
    }
}

fn fallback_code(status: u16) -> ErrorCode {
    match status {
        400 | 422 => ErrorCode::ValidationError,
        401 => ErrorCode::InvalidToken,
        403 => ErrorCode::PermissionDenied,
        404 => ErrorCode::UserNotFound,
        408 | 504 => ErrorCode::TimeoutError,
        429 => ErrorCode::RateLimitExceeded,
        _ => ErrorCode::ServerError,
    }
}

impl From<validator::ValidationErrors> for ClientError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut details: Vec<ValidationDetail> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |e| ValidationDetail {
                    field: field.to_string(),
                    message: e
                        .message
                        .clone()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| e.code.to_string()),
                })
            })
            .collect();
        details.sort_by(|a, b| a.field.cmp(&b.field));

        let message = if details.len() == 1 {
            details[0].message.clone()
        } else {
            format!("{} validation errors", details.len())
        };

        ClientError::Validation { message, details }
    }
}

impl From<config::ConfigError> for ClientError {
    fn from(err: config::ConfigError) -> Self {
        ClientError::Config(err.to_string())
    }
}
