//! Webhook domain models.
//!
//! Webhook and delivery records are decoded with every field optional: the
//! backend does not guarantee any of them, identifiers and timestamps
//! included.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::crypto::{self, SignatureError};
use shared::validation::{validate_http_url, validate_webhook_headers, validate_webhook_secret};
use shared::Patch;
use std::collections::HashMap;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::codec::JsonValue;

wire_enum! {
    pub enum WebhookStatus {
        Active => ("active", "Active"),
        Inactive => ("inactive", "Inactive"),
        Disabled => ("disabled", "Disabled"),
        Error => ("error", "Error"),
    }
}

wire_enum! {
    pub enum DeliveryStatus {
        Pending => ("pending", "Pending"),
        Sending => ("sending", "Sending"),
        Success => ("success", "Delivered"),
        Failed => ("failed", "Failed"),
        Retrying => ("retrying", "Retrying"),
        Cancelled => ("cancelled", "Cancelled"),
    }
}

impl DeliveryStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            DeliveryStatus::Success | DeliveryStatus::Failed | DeliveryStatus::Cancelled
        )
    }
}

wire_enum! {
    /// Events a webhook can subscribe to.
    pub enum WebhookEventType {
        // User
        UserCreated => ("user.created", "User created"),
        UserUpdated => ("user.updated", "User updated"),
        UserDeleted => ("user.deleted", "User deleted"),
        UserActivated => ("user.activated", "User activated"),
        UserDeactivated => ("user.deactivated", "User deactivated"),
        UserLogin => ("user.login", "User logged in"),
        UserLogout => ("user.logout", "User logged out"),
        UserPasswordChanged => ("user.password_changed", "Password changed"),
        UserEmailVerified => ("user.email_verified", "Email verified"),

        // Authentication
        LoginSuccess => ("auth.login_success", "Login succeeded"),
        LoginFailed => ("auth.login_failed", "Login failed"),
        Logout => ("auth.logout", "Logged out"),
        PasswordReset => ("auth.password_reset", "Password reset"),
        TwoFactorEnabled => ("auth.2fa_enabled", "Two-factor enabled"),
        TwoFactorDisabled => ("auth.2fa_disabled", "Two-factor disabled"),
        AccountLocked => ("auth.account_locked", "Account locked"),
        SuspiciousActivity => ("auth.suspicious_activity", "Suspicious activity"),

        // Sessions
        SessionCreated => ("session.created", "Session created"),
        SessionExpired => ("session.expired", "Session expired"),
        SessionRevoked => ("session.revoked", "Session revoked"),

        // API keys
        ApiKeyCreated => ("api_key.created", "API key created"),
        ApiKeyRevoked => ("api_key.revoked", "API key revoked"),
        ApiKeyExpired => ("api_key.expired", "API key expired"),
        ApiKeyRateLimited => ("api_key.rate_limited", "API key rate limited"),

        // Organizations
        OrganizationCreated => ("organization.created", "Organization created"),
        OrganizationUpdated => ("organization.updated", "Organization updated"),
        OrganizationMemberAdded => ("organization.member_added", "Member added"),
        OrganizationMemberRemoved => ("organization.member_removed", "Member removed"),
        OrganizationRoleChanged => ("organization.role_changed", "Member role changed"),

        // Roles and permissions
        RoleAssigned => ("role.assigned", "Role assigned"),
        RoleRevoked => ("role.revoked", "Role revoked"),
        PermissionGranted => ("permission.granted", "Permission granted"),
        PermissionRevoked => ("permission.revoked", "Permission revoked"),

        // Security
        SecurityAlert => ("security.alert", "Security alert"),
        BreachDetected => ("security.breach_detected", "Breach detected"),
        ComplianceViolation => ("security.compliance_violation", "Compliance violation"),

        // System
        SystemMaintenance => ("system.maintenance", "System maintenance"),
        SystemError => ("system.error", "System error"),
        BackupCompleted => ("system.backup_completed", "Backup completed"),

        CustomEvent => ("custom.event", "Custom event"),
    }
}

impl WebhookEventType {
    /// Part before the dot, e.g. `user`.
    pub fn category(&self) -> &'static str {
        use crate::labels::WireEnum;
        let wire = self.as_str();
        wire.split('.').next().unwrap_or(wire)
    }
}

wire_enum! {
    /// HTTP method used for deliveries.
    #[derive(Default)]
    pub enum HttpMethod {
        #[default]
        Post => ("POST", "POST"),
        Put => ("PUT", "PUT"),
        Patch => ("PATCH", "PATCH"),
    }
}

pub const DEFAULT_TIMEOUT_SECONDS: u32 = 30;
pub const DEFAULT_RETRY_COUNT: u32 = 3;

/// A configured webhook endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Webhook {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<HttpMethod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<HashMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub events: Option<Vec<WebhookEventType>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<WebhookStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u32>,
    /// Same setting under the name the webhook API responds with.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verify_ssl: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by: Option<String>,
    #[serde(
        default,
        with = "shared::iso8601::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        with = "shared::iso8601::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        with = "shared::iso8601::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_triggered_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        with = "shared::iso8601::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_delivery: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_deliveries: Option<u64>,
    /// Percentage computed by the server, 0-100.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_success_rate: Option<f64>,
}

impl Webhook {
    /// Fraction of successful deliveries, `None` before the first delivery.
    ///
    /// Uses the counters when present, else the server's percentage.
    pub fn success_rate(&self) -> Option<f64> {
        let success = self.success_count.unwrap_or(0);
        let total = success + self.failure_count.unwrap_or(0);
        if total > 0 {
            return Some(success as f64 / total as f64);
        }
        match (self.total_deliveries, self.delivery_success_rate) {
            (Some(total), Some(rate)) if total > 0 => Some(rate / 100.0),
            _ => None,
        }
    }

    /// Timeout in seconds under either field name.
    pub fn effective_timeout(&self) -> u32 {
        self.timeout_seconds
            .or(self.timeout)
            .unwrap_or(DEFAULT_TIMEOUT_SECONDS)
    }

    pub fn subscribes_to(&self, event: WebhookEventType) -> bool {
        self.events
            .as_ref()
            .is_some_and(|events| events.contains(&event))
    }

    /// Delivers only when active and not disabled.
    pub fn is_enabled(&self) -> bool {
        self.is_active.unwrap_or(false) && self.status != Some(WebhookStatus::Disabled)
    }

    /// Checks a captured delivery body against this webhook's secret.
    pub fn verify_signature(&self, payload: &str, header_value: &str) -> Result<bool, SignatureError> {
        let secret = self.secret.as_deref().ok_or(SignatureError::EmptySecret)?;
        crypto::verify_webhook_signature(secret, payload, header_value)
    }
}

/// One delivery attempt of a webhook event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookDelivery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_type: Option<WebhookEventType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<DeliveryStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    /// Receiver status under the name the webhook API responds with.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attempt_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_headers: Option<HashMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_headers: Option<HashMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(
        default,
        with = "shared::iso8601::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        with = "shared::iso8601::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub delivered_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        with = "shared::iso8601::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub next_retry_at: Option<DateTime<Utc>>,
}

impl WebhookDelivery {
    /// Receiver status under either field name.
    pub fn response_status(&self) -> Option<u16> {
        self.status_code.or(self.http_status)
    }

    /// 2xx response from the receiver.
    pub fn is_success_status(&self) -> bool {
        self.response_status()
            .is_some_and(|code| (200..300).contains(&code))
    }

    /// Signature header that was sent with the delivery, if recorded.
    pub fn signature(&self) -> Option<&str> {
        self.request_headers.as_ref().and_then(|headers| {
            headers
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(crypto::SIGNATURE_HEADER))
                .map(|(_, value)| value.as_str())
        })
    }
}

/// Catalog entry describing a subscribable event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookEventInfo {
    pub event: WebhookEventType,
    pub name: String,
    pub description: String,
    pub category: String,
}

fn default_timeout() -> u32 {
    DEFAULT_TIMEOUT_SECONDS
}

fn default_retry_count() -> u32 {
    DEFAULT_RETRY_COUNT
}

fn default_true() -> bool {
    true
}

/// Request payload for creating a webhook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateWebhookRequest {
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: Option<String>,

    #[validate(
        url(message = "Invalid URL format"),
        length(max = 2048, message = "URL must be at most 2048 characters")
    )]
    #[validate(custom(function = "validate_http_url"))]
    pub url: String,

    #[validate(length(min = 1, message = "Select at least one event"))]
    pub events: Vec<WebhookEventType>,

    /// Generated server-side when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "validate_webhook_secret"))]
    pub secret: Option<String>,

    #[serde(default)]
    #[validate(custom(function = "validate_webhook_headers"))]
    pub headers: HashMap<String, String>,

    #[serde(default = "default_timeout")]
    #[validate(range(min = 5, max = 120, message = "Timeout must be 5-120 seconds"))]
    pub timeout_seconds: u32,

    #[serde(default = "default_retry_count")]
    #[validate(range(max = 10, message = "Retry count must be 0-10"))]
    pub retry_count: u32,

    #[serde(default)]
    pub method: HttpMethod,

    #[serde(default = "default_true")]
    pub verify_ssl: bool,

    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl CreateWebhookRequest {
    /// Request with backend defaults for everything but the essentials.
    pub fn new(name: impl Into<String>, url: impl Into<String>, events: Vec<WebhookEventType>) -> Self {
        Self {
            name: name.into(),
            description: None,
            url: url.into(),
            events,
            secret: None,
            headers: HashMap::new(),
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            retry_count: DEFAULT_RETRY_COUNT,
            method: HttpMethod::default(),
            verify_ssl: true,
            is_active: true,
        }
    }
}

/// Request payload for updating a webhook. Unset fields are left unchanged.
///
/// `description`, `secret` and `headers` can be cleared by sending `null`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateWebhookRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Patch::is_unset")]
    pub description: Patch<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub events: Option<Vec<WebhookEventType>>,
    #[serde(default, skip_serializing_if = "Patch::is_unset")]
    pub secret: Patch<String>,
    #[serde(default, skip_serializing_if = "Patch::is_unset")]
    pub headers: Patch<HashMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_seconds: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<HttpMethod>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verify_ssl: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl Validate for UpdateWebhookRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Some(name) = &self.name {
            if name.is_empty() || name.chars().count() > 100 {
                errors.add("name", message_error("length", "Name must be 1-100 characters"));
            }
        }
        if let Some(url) = &self.url {
            if let Err(err) = validate_http_url(url) {
                errors.add("url", err);
            }
        }
        if self.events.as_ref().is_some_and(Vec::is_empty) {
            errors.add("events", message_error("length", "Select at least one event"));
        }
        if let Some(secret) = self.secret.as_value() {
            if let Err(err) = validate_webhook_secret(secret) {
                errors.add("secret", err);
            }
        }
        if let Some(headers) = self.headers.as_value() {
            if let Err(err) = validate_webhook_headers(headers) {
                errors.add("headers", err);
            }
        }
        if self.timeout_seconds.is_some_and(|t| !(5..=120).contains(&t)) {
            errors.add("timeout_seconds", message_error("range", "Timeout must be 5-120 seconds"));
        }
        if self.retry_count.is_some_and(|r| r > 10) {
            errors.add("retry_count", message_error("range", "Retry count must be 0-10"));
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

fn message_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

/// Sends a synthetic event to the endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestWebhookRequest {
    pub event_type: WebhookEventType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<JsonValue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookTestResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_time_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_id: Option<String>,
}

/// Aggregate delivery statistics over a trailing window of days.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookStats {
    pub total_webhooks: u64,
    pub active_webhooks: u64,
    pub total_deliveries: u64,
    pub successful_deliveries: u64,
    pub failed_deliveries: u64,
    /// Percentage, 0-100.
    pub average_success_rate: f64,
    /// Delivery count per event name.
    pub event_breakdown: HashMap<String, u64>,
    pub recent_activity: Vec<JsonValue>,
}

impl WebhookStats {
    pub fn inactive_webhooks(&self) -> u64 {
        self.total_webhooks.saturating_sub(self.active_webhooks)
    }

    /// Deliveries that neither succeeded nor failed yet.
    pub fn pending_deliveries(&self) -> u64 {
        self.total_deliveries
            .saturating_sub(self.successful_deliveries + self.failed_deliveries)
    }

    pub fn deliveries_for(&self, event: WebhookEventType) -> u64 {
        use crate::labels::WireEnum;
        self.event_breakdown.get(event.as_str()).copied().unwrap_or(0)
    }
}

/// Returned after rotating a webhook signing secret.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebhookSecretResponse {
    pub secret: String,
    pub message: String,
}
