//! HTTP client for the auth admin backend.
//!
//! Each operation validates its request, sends it with a fresh
//! `X-Request-ID` and decodes the response either from the standard envelope
//! (`{"success": .., "data": ..}`) or from a bare record.

use std::time::Duration;

use domain::models::admin_user::{
    BulkOperationResult, BulkUserOperation, CreateUserRequest, SuspendUserRequest,
    UnsuspendUserResult, UpdateUserRequest, UserListQuery, UserManagementResponse,
};
use domain::models::analytics::{AnalyticsQuery, AnalyticsSummary};
use domain::models::audit_log::{AuditLogEntry, AuditLogQuery};
use domain::models::auth::{
    AuthResponse, AuthUser, ChangePasswordRequest, ForgotPasswordRequest, LoginRequest,
    RefreshTokenRequest, RegisterRequest, ResetPasswordRequest, TokenRefreshResponse,
    TwoFactorLoginRequest, TwoFactorVerifyRequest,
};
use domain::models::backup::{
    BackupJob, CreateBackupRequest, CreateRestoreRequest, RestoreJob,
};
use domain::models::dashboard::{
    AdminDashboardData, SecurityReport, SystemHealth, SystemStats, UserActivityReport,
};
use domain::models::envelope::{ApiResponse, MessageResponse};
use domain::models::export::{CreateExportRequest, ExportJob};
use domain::models::profile::{Profile, UpdateProfileRequest};
use domain::models::session::{
    LoginHistoryEntry, RevokeSessionRequest, SessionTerminationResult, UserSession,
};
use domain::models::webhook::{
    CreateWebhookRequest, TestWebhookRequest, UpdateWebhookRequest, Webhook, WebhookDelivery,
    WebhookEventInfo, WebhookSecretResponse, WebhookStats, WebhookTestResult,
};
use domain::{JsonValue, WireError, WireRecord};
use reqwest::{Method, RequestBuilder};
use shared::{Page, PageQuery};
use tracing::{debug, error, warn};
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::config::ApiConfig;
use crate::endpoints;
use crate::error::{ClientError, ClientResult};

/// Header carrying the per-request correlation id.
pub const REQUEST_ID_HEADER: &str = "X-Request-ID";

const ENVELOPE_KEYS: [&str; 4] = ["success", "data", "error", "metadata"];

/// Longest trailing window, in days, the report endpoints accept.
pub const MAX_REPORT_DAYS: u32 = 365;

/// Whether a request needs the bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Auth {
    Public,
    Bearer,
}

/// How a successful body is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Shape {
    /// Envelope when it looks like one, bare record otherwise.
    Detect,
    /// Always the record itself, for records with their own `success` key.
    Bare,
}

/// API client for making requests to the auth admin backend.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    api: ApiConfig,
    access_token: Option<String>,
}

impl ApiClient {
    /// Creates a new API client.
    pub fn new(api: &ApiConfig) -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(api.timeout_secs))
            .connect_timeout(Duration::from_secs(api.connect_timeout_secs))
            .user_agent(api.user_agent.clone())
            .build()?;

        Ok(Self {
            http,
            api: api.clone(),
            access_token: None,
        })
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    pub fn set_access_token(&mut self, token: impl Into<String>) {
        self.access_token = Some(token.into());
    }

    pub fn clear_access_token(&mut self) {
        self.access_token = None;
    }

    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    /// Gets the base URL.
    pub fn base_url(&self) -> &str {
        &self.api.base_url
    }

    // ========================================================================
    // Authentication
    // ========================================================================

    pub async fn login(&self, request: &LoginRequest) -> ClientResult<AuthResponse> {
        request.validate()?;
        self.send(Method::POST, endpoints::AUTH_LOGIN, Auth::Public, request)
            .await
    }

    pub async fn register(&self, request: &RegisterRequest) -> ClientResult<AuthResponse> {
        request.validate()?;
        self.send(Method::POST, endpoints::AUTH_REGISTER, Auth::Public, request)
            .await
    }

    pub async fn refresh(&self, request: &RefreshTokenRequest) -> ClientResult<TokenRefreshResponse> {
        self.send(Method::POST, endpoints::AUTH_REFRESH, Auth::Public, request)
            .await
    }

    /// Ends the server-side session and forgets the access token.
    pub async fn logout(&mut self) -> ClientResult<()> {
        self.send_no_content(Method::POST, endpoints::AUTH_LOGOUT)
            .await?;
        self.clear_access_token();
        Ok(())
    }

    pub async fn forgot_password(
        &self,
        request: &ForgotPasswordRequest,
    ) -> ClientResult<MessageResponse> {
        request.validate()?;
        self.send(
            Method::POST,
            endpoints::AUTH_FORGOT_PASSWORD,
            Auth::Public,
            request,
        )
        .await
    }

    pub async fn reset_password(
        &self,
        request: &ResetPasswordRequest,
    ) -> ClientResult<MessageResponse> {
        request.validate()?;
        if !request.passwords_match() {
            return Err(field_error(
                "confirm_password",
                "password_mismatch",
                "Passwords do not match",
            ));
        }
        self.send(
            Method::POST,
            endpoints::AUTH_RESET_PASSWORD,
            Auth::Public,
            request,
        )
        .await
    }

    /// Confirms TOTP enrollment for the signed-in user.
    pub async fn verify_two_factor(
        &self,
        request: &TwoFactorVerifyRequest,
    ) -> ClientResult<MessageResponse> {
        request.validate()?;
        self.send(Method::POST, endpoints::TWO_FACTOR_VERIFY, Auth::Bearer, request)
            .await
    }

    /// Completes a login that answered with `requires2fa`.
    pub async fn two_factor_login(
        &self,
        request: &TwoFactorLoginRequest,
    ) -> ClientResult<AuthResponse> {
        request.validate()?;
        self.send(Method::POST, endpoints::TWO_FACTOR_LOGIN, Auth::Public, request)
            .await
    }

    pub async fn current_user(&self) -> ClientResult<AuthUser> {
        self.get(endpoints::AUTH_ME, &[]).await
    }

    // ========================================================================
    // Profile
    // ========================================================================

    pub async fn update_profile(&self, request: &UpdateProfileRequest) -> ClientResult<Profile> {
        request.validate()?;
        self.send(Method::PUT, endpoints::PROFILE_ME, Auth::Bearer, request)
            .await
    }

    pub async fn change_password(
        &self,
        request: &ChangePasswordRequest,
    ) -> ClientResult<MessageResponse> {
        request.validate()?;
        self.send(
            Method::POST,
            endpoints::PROFILE_CHANGE_PASSWORD,
            Auth::Bearer,
            request,
        )
        .await
    }

    // ========================================================================
    // User management
    // ========================================================================

    pub async fn list_users(
        &self,
        query: &UserListQuery,
    ) -> ClientResult<Page<UserManagementResponse>> {
        self.get_page(endpoints::ADMIN_USERS, &query.page, query.to_query())
            .await
    }

    pub async fn get_user(&self, user_id: &str) -> ClientResult<UserManagementResponse> {
        self.get(&endpoints::admin_user(user_id), &[]).await
    }

    pub async fn create_user(
        &self,
        request: &CreateUserRequest,
    ) -> ClientResult<UserManagementResponse> {
        request.validate()?;
        self.send(Method::POST, endpoints::ADMIN_USERS, Auth::Bearer, request)
            .await
    }

    pub async fn update_user(
        &self,
        user_id: &str,
        request: &UpdateUserRequest,
    ) -> ClientResult<UserManagementResponse> {
        request.validate()?;
        self.send(
            Method::PUT,
            &endpoints::admin_user(user_id),
            Auth::Bearer,
            request,
        )
        .await
    }

    pub async fn suspend_user(
        &self,
        user_id: &str,
        request: &SuspendUserRequest,
    ) -> ClientResult<MessageResponse> {
        request.validate()?;
        self.send(
            Method::POST,
            &endpoints::admin_user_suspend(user_id),
            Auth::Bearer,
            request,
        )
        .await
    }

    pub async fn unsuspend_user(&self, user_id: &str) -> ClientResult<UnsuspendUserResult> {
        self.send_query(Method::POST, &endpoints::admin_user_unsuspend(user_id), &[])
            .await
    }

    /// Soft deletes a user, or removes it for good with `hard_delete`.
    pub async fn delete_user(
        &self,
        user_id: &str,
        hard_delete: bool,
    ) -> ClientResult<MessageResponse> {
        self.send_query(
            Method::DELETE,
            &endpoints::admin_user(user_id),
            &[("hard_delete", hard_delete.to_string())],
        )
        .await
    }

    pub async fn bulk_user_operation(
        &self,
        request: &BulkUserOperation,
    ) -> ClientResult<BulkOperationResult> {
        request.validate()?;
        self.send(Method::POST, endpoints::ADMIN_USERS_BULK, Auth::Bearer, request)
            .await
    }

    // ========================================================================
    // Sessions and audit
    // ========================================================================

    pub async fn list_sessions(&self, page: &PageQuery) -> ClientResult<Page<UserSession>> {
        self.get_page(endpoints::SESSIONS, page, page.to_query())
            .await
    }

    pub async fn revoke_session(
        &self,
        request: &RevokeSessionRequest,
    ) -> ClientResult<MessageResponse> {
        request.validate()?;
        self.send(Method::POST, endpoints::SESSIONS_REVOKE, Auth::Bearer, request)
            .await
    }

    /// Ends one session on behalf of an administrator.
    pub async fn terminate_session(&self, session_id: &str) -> ClientResult<MessageResponse> {
        self.send_query(Method::POST, &endpoints::admin_session_terminate(session_id), &[])
            .await
    }

    /// Ends every session of `user_id`.
    pub async fn terminate_all_sessions(
        &self,
        user_id: &str,
    ) -> ClientResult<SessionTerminationResult> {
        if user_id.trim().is_empty() {
            return Err(field_error("user_id", "required", "User id is required"));
        }
        self.send_query(
            Method::POST,
            endpoints::ADMIN_SESSIONS_TERMINATE_ALL,
            &[("user_id", user_id.to_string())],
        )
        .await
    }

    pub async fn login_history(&self, page: &PageQuery) -> ClientResult<Page<LoginHistoryEntry>> {
        self.get_page(endpoints::ADMIN_LOGIN_HISTORY, page, page.to_query())
            .await
    }

    pub async fn list_audit_logs(&self, query: &AuditLogQuery) -> ClientResult<Page<AuditLogEntry>> {
        if query.has_inverted_range() {
            return Err(field_error(
                "start_date",
                "date_range",
                "Start date must be before end date",
            ));
        }
        self.get_page(endpoints::AUDIT_LOGS, &query.page, query.to_query())
            .await
    }

    // ========================================================================
    // Dashboard and analytics
    // ========================================================================

    pub async fn system_stats(&self) -> ClientResult<SystemStats> {
        self.get(endpoints::ADMIN_STATS, &[]).await
    }

    pub async fn dashboard(&self) -> ClientResult<AdminDashboardData> {
        self.get(endpoints::ADMIN_DASHBOARD, &[]).await
    }

    pub async fn security_report(&self, days: u32) -> ClientResult<SecurityReport> {
        check_days(days)?;
        self.get(endpoints::ADMIN_SECURITY_REPORT, &[("days", days.to_string())])
            .await
    }

    /// Activity over the last `days`, for one user or everyone.
    pub async fn activity_report(
        &self,
        user_id: Option<&str>,
        days: u32,
    ) -> ClientResult<UserActivityReport> {
        check_days(days)?;
        let mut query = vec![("days", days.to_string())];
        if let Some(user_id) = user_id {
            query.push(("user_id", user_id.to_string()));
        }
        self.get(endpoints::ADMIN_ACTIVITY_REPORT, &query).await
    }

    pub async fn system_health(&self) -> ClientResult<SystemHealth> {
        self.get(endpoints::ADMIN_SYSTEM_HEALTH, &[]).await
    }

    pub async fn analytics(&self, query: &AnalyticsQuery) -> ClientResult<AnalyticsSummary> {
        self.get(endpoints::ANALYTICS, &query.to_query()).await
    }

    // ========================================================================
    // Export, backup and restore jobs
    // ========================================================================

    pub async fn create_export(&self, request: &CreateExportRequest) -> ClientResult<ExportJob> {
        request.validate()?;
        self.send(Method::POST, endpoints::ADMIN_EXPORTS, Auth::Bearer, request)
            .await
    }

    pub async fn get_export(&self, export_id: &str) -> ClientResult<ExportJob> {
        self.get(&endpoints::admin_export(export_id), &[]).await
    }

    pub async fn list_exports(&self, page: &PageQuery) -> ClientResult<Page<ExportJob>> {
        self.get_page(endpoints::ADMIN_EXPORTS, page, page.to_query())
            .await
    }

    pub async fn create_backup(&self, request: &CreateBackupRequest) -> ClientResult<BackupJob> {
        request.validate()?;
        self.send(Method::POST, endpoints::ADMIN_BACKUPS, Auth::Bearer, request)
            .await
    }

    pub async fn get_backup(&self, backup_id: &str) -> ClientResult<BackupJob> {
        self.get(&endpoints::admin_backup(backup_id), &[]).await
    }

    pub async fn list_backups(&self, page: &PageQuery) -> ClientResult<Page<BackupJob>> {
        self.get_page(endpoints::ADMIN_BACKUPS, page, page.to_query())
            .await
    }

    pub async fn create_restore(&self, request: &CreateRestoreRequest) -> ClientResult<RestoreJob> {
        request.validate()?;
        self.send(Method::POST, endpoints::ADMIN_RESTORES, Auth::Bearer, request)
            .await
    }

    pub async fn get_restore(&self, restore_id: &str) -> ClientResult<RestoreJob> {
        self.get(&endpoints::admin_restore(restore_id), &[]).await
    }

    // ========================================================================
    // Webhooks
    // ========================================================================

    pub async fn list_webhooks(&self, page: &PageQuery) -> ClientResult<Page<Webhook>> {
        self.get_page(endpoints::WEBHOOKS, page, page.to_query())
            .await
    }

    pub async fn get_webhook(&self, webhook_id: &str) -> ClientResult<Webhook> {
        self.get(&endpoints::webhook(webhook_id), &[]).await
    }

    pub async fn create_webhook(&self, request: &CreateWebhookRequest) -> ClientResult<Webhook> {
        request.validate()?;
        self.send(Method::POST, endpoints::WEBHOOKS, Auth::Bearer, request)
            .await
    }

    pub async fn update_webhook(
        &self,
        webhook_id: &str,
        request: &UpdateWebhookRequest,
    ) -> ClientResult<Webhook> {
        request.validate()?;
        self.send(
            Method::PUT,
            &endpoints::webhook(webhook_id),
            Auth::Bearer,
            request,
        )
        .await
    }

    pub async fn delete_webhook(&self, webhook_id: &str) -> ClientResult<()> {
        self.send_no_content(Method::DELETE, &endpoints::webhook(webhook_id))
            .await
    }

    /// Sends a synthetic event. The result carries its own `success` flag,
    /// so the body is never read as an envelope.
    pub async fn test_webhook(
        &self,
        webhook_id: &str,
        request: &TestWebhookRequest,
    ) -> ClientResult<WebhookTestResult> {
        self.send_shaped(
            Method::POST,
            &endpoints::webhook_test(webhook_id),
            Auth::Bearer,
            request,
            Shape::Bare,
        )
        .await
    }

    pub async fn list_webhook_deliveries(
        &self,
        webhook_id: &str,
        page: &PageQuery,
    ) -> ClientResult<Page<WebhookDelivery>> {
        self.get_page(&endpoints::webhook_deliveries(webhook_id), page, page.to_query())
            .await
    }

    /// Queues another attempt of a failed delivery.
    pub async fn retry_webhook_delivery(
        &self,
        webhook_id: &str,
        delivery_id: &str,
    ) -> ClientResult<MessageResponse> {
        let path = endpoints::webhook_delivery_retry(webhook_id, delivery_id);
        self.send_query(Method::POST, &path, &[]).await
    }

    /// Rotates the signing secret. The new secret is only returned here.
    pub async fn regenerate_webhook_secret(
        &self,
        webhook_id: &str,
    ) -> ClientResult<WebhookSecretResponse> {
        self.send_query(Method::POST, &endpoints::webhook_regenerate_secret(webhook_id), &[])
            .await
    }

    pub async fn webhook_stats(&self, days: u32) -> ClientResult<WebhookStats> {
        check_days(days)?;
        self.get(endpoints::WEBHOOK_STATS, &[("days", days.to_string())])
            .await
    }

    /// Catalog of subscribable events.
    pub async fn webhook_events(&self) -> ClientResult<Vec<WebhookEventInfo>> {
        self.get(endpoints::WEBHOOK_EVENTS, &[]).await
    }

    // ========================================================================
    // Transport
    // ========================================================================

    fn request(&self, method: Method, path: &str, auth: Auth) -> ClientResult<(RequestBuilder, String)> {
        let request_id = Uuid::new_v4().to_string();
        let mut builder = self
            .http
            .request(method, self.api.url_for(path))
            .header(REQUEST_ID_HEADER, &request_id);

        match (auth, &self.access_token) {
            (_, Some(token)) => builder = builder.bearer_auth(token),
            (Auth::Bearer, None) => return Err(ClientError::MissingAccessToken),
            (Auth::Public, None) => {}
        }

        Ok((builder, request_id))
    }

    async fn get<T: WireRecord>(
        &self,
        path: &str,
        query: &[(&'static str, String)],
    ) -> ClientResult<T> {
        let (builder, request_id) = self.request(Method::GET, path, Auth::Bearer)?;
        let body = self
            .execute(builder.query(query), &Method::GET, path, &request_id, Shape::Detect)
            .await?;
        decode_record(path, body)
    }

    async fn get_page<T: WireRecord>(
        &self,
        path: &str,
        page: &PageQuery,
        query: Vec<(&'static str, String)>,
    ) -> ClientResult<Page<T>> {
        page.validate()
            .map_err(|e| field_error("page", "pagination", e.to_string()))?;
        let (builder, request_id) = self.request(Method::GET, path, Auth::Bearer)?;
        let body = self
            .execute(builder.query(&query), &Method::GET, path, &request_id, Shape::Detect)
            .await?;
        decode_page(body, page)
    }

    async fn send<B: WireRecord, T: WireRecord>(
        &self,
        method: Method,
        path: &str,
        auth: Auth,
        body: &B,
    ) -> ClientResult<T> {
        self.send_shaped(method, path, auth, body, Shape::Detect)
            .await
    }

    async fn send_shaped<B: WireRecord, T: WireRecord>(
        &self,
        method: Method,
        path: &str,
        auth: Auth,
        body: &B,
        shape: Shape,
    ) -> ClientResult<T> {
        let payload = body.to_json()?;
        let (builder, request_id) = self.request(method.clone(), path, auth)?;
        let body = self
            .execute(builder.json(&payload), &method, path, &request_id, shape)
            .await?;
        decode_record(path, body)
    }

    /// Request without a body, answered by a record.
    async fn send_query<T: WireRecord>(
        &self,
        method: Method,
        path: &str,
        query: &[(&'static str, String)],
    ) -> ClientResult<T> {
        let (builder, request_id) = self.request(method.clone(), path, Auth::Bearer)?;
        let body = self
            .execute(builder.query(query), &method, path, &request_id, Shape::Detect)
            .await?;
        decode_record(path, body)
    }

    async fn send_no_content(&self, method: Method, path: &str) -> ClientResult<()> {
        let (builder, request_id) = self.request(method.clone(), path, Auth::Bearer)?;
        self.execute(builder, &method, path, &request_id, Shape::Detect)
            .await?;
        Ok(())
    }

    /// Sends the request and returns the payload JSON of a successful
    /// response, unwrapped from the envelope when `shape` allows one.
    async fn execute(
        &self,
        builder: RequestBuilder,
        method: &Method,
        path: &str,
        request_id: &str,
        shape: Shape,
    ) -> ClientResult<JsonValue> {
        debug!(method = %method, path, request_id, "Sending request");

        let response = builder.send().await.map_err(|e| {
            error!(method = %method, path, request_id, error = %e, "Request failed");
            ClientError::Http(e)
        })?;

        let status = response.status().as_u16();
        let text = response.text().await?;

        if !(200..300).contains(&status) {
            let err = ClientError::from_response_body(status, &text);
            warn!(method = %method, path, request_id, status, error = %err, "API request failed");
            return Err(err);
        }

        if text.trim().is_empty() {
            return Ok(JsonValue::Null);
        }

        let body: JsonValue = serde_json::from_str(&text).map_err(|source| {
            warn!(path, request_id, error = %source, "Response body is not JSON");
            WireError::Decode {
                record: "ResponseBody",
                source,
            }
        })?;

        match shape {
            Shape::Detect => unwrap_envelope(status, body),
            Shape::Bare => Ok(body),
        }
    }
}

fn decode_record<T: WireRecord>(path: &str, body: JsonValue) -> ClientResult<T> {
    if body.is_null() {
        return Err(ClientError::EmptyResponse {
            path: path.to_string(),
        });
    }
    Ok(T::from_json(body)?)
}

/// Returns the payload of an envelope, or the body itself when it is a bare
/// record or a successful envelope without data.
fn unwrap_envelope(status: u16, body: JsonValue) -> ClientResult<JsonValue> {
    if !is_envelope(&body) {
        return Ok(body);
    }

    let envelope = ApiResponse::<JsonValue>::from_json(body.clone())?;
    match envelope.into_result() {
        Ok(Some(data)) => Ok(data),
        Ok(None) => Ok(body),
        Err(error) => {
            warn!(status, code = %error.code, message = %error.message, "API reported failure");
            Err(ClientError::from_error_body(status, error))
        }
    }
}

fn is_envelope(body: &JsonValue) -> bool {
    let JsonValue::Object(map) = body else {
        return false;
    };
    map.get("success").is_some_and(JsonValue::is_boolean)
        && map.keys().all(|key| ENVELOPE_KEYS.contains(&key.as_str()))
        && map
            .get("error")
            .map_or(true, |error| error.is_object() || error.is_null())
}

/// Decodes a list response: a page object, or a bare array taken as the
/// requested page of an unknown-length collection.
fn decode_page<T: WireRecord>(body: JsonValue, query: &PageQuery) -> ClientResult<Page<T>> {
    match body {
        JsonValue::Array(_) => {
            let items = Vec::<T>::from_json(body)?;
            let seen = query.offset() + items.len() as u64;
            let mut page = Page::from_parts(items, seen, query);
            page.has_next = page.items.len() as u64 == u64::from(query.limit);
            Ok(page)
        }
        other => Ok(Page::<T>::from_json(other)?),
    }
}

fn check_days(days: u32) -> ClientResult<()> {
    if (1..=MAX_REPORT_DAYS).contains(&days) {
        Ok(())
    } else {
        Err(field_error(
            "days",
            "range",
            format!("Days must be between 1 and {MAX_REPORT_DAYS}, got {days}"),
        ))
    }
}

fn field_error(
    field: &'static str,
    code: &'static str,
    message: impl Into<String>,
) -> ClientError {
    let message: String = message.into();
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    let mut errors = ValidationErrors::new();
    errors.add(field, err);
    ClientError::from(errors)
}
