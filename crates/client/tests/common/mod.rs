//! Common test utilities for client integration tests.
//!
//! Spawns an in-process axum server that answers like the auth admin backend,
//! using each of its response shapes: envelopes, bare records, bare arrays and
//! FastAPI `{detail}` errors.

// Helpers are shared by several test files and not every one uses all of them.
#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use auth_admin_client::{ApiClient, ApiConfig};
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde_json::{json, Value};

pub const TEST_TOKEN: &str = "test-access-token";
pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const ADMIN_PASSWORD: &str = "Admin123!";

/// Request as seen by the stub server.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub request_id: Option<String>,
    pub authorization: Option<String>,
    pub query: HashMap<String, String>,
    pub body: Option<Value>,
}

#[derive(Clone, Default)]
pub struct StubState {
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl StubState {
    fn record(
        &self,
        path: &str,
        headers: &HeaderMap,
        query: HashMap<String, String>,
        body: Option<Value>,
    ) {
        let header = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string)
        };
        self.requests.lock().unwrap().push(RecordedRequest {
            path: path.to_string(),
            request_id: header("x-request-id"),
            authorization: header("authorization"),
            query,
            body,
        });
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last_request(&self) -> RecordedRequest {
        self.requests()
            .pop()
            .expect("stub server received no request")
    }
}

/// Running stub server.
pub struct TestServer {
    pub addr: SocketAddr,
    pub state: StubState,
}

impl TestServer {
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Client without an access token.
    pub fn client(&self) -> ApiClient {
        ApiClient::new(&ApiConfig::new(self.base_url())).expect("Failed to build client")
    }

    /// Client carrying the token the stub accepts.
    pub fn authed_client(&self) -> ApiClient {
        self.client().with_access_token(TEST_TOKEN)
    }
}

/// Start the stub server on an ephemeral port.
pub async fn spawn_server() -> TestServer {
    let state = StubState::default();
    let app = Router::new()
        .route("/api/v1/auth/login", post(login))
        .route("/api/v1/auth/logout", post(logout))
        .route("/api/v1/auth/me", get(me))
        .route("/api/v1/admin/users", get(list_users))
        .route("/api/v1/admin/users/:id", get(get_user).delete(delete_user))
        .route("/api/v1/admin/users/:id/suspend", post(suspend_user))
        .route("/api/v1/admin/users/:id/unsuspend", post(unsuspend_user))
        .route("/api/v1/admin/sessions/:id/terminate", post(terminate_session))
        .route("/api/v1/admin/sessions/terminate-all", post(terminate_all_sessions))
        .route("/api/v1/admin/activity-report", get(activity_report))
        .route("/api/v1/admin/stats", get(malformed_stats))
        .route("/api/v1/admin/system/health", get(system_health))
        .route("/api/v1/sessions", get(list_sessions))
        .route("/api/v1/webhooks/stats", get(webhook_stats))
        .route("/api/v1/webhooks/:id", delete(delete_webhook))
        .route("/api/v1/webhooks/:id/test", post(test_webhook))
        .route("/api/v1/webhooks/:id/regenerate-secret", post(regenerate_secret))
        .route(
            "/api/v1/webhooks/:id/deliveries/:delivery_id/retry",
            post(retry_delivery),
        )
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind stub server");
    let addr = listener.local_addr().expect("No local address");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Stub server failed");
    });

    TestServer { addr, state }
}

// ============================================================================
// Fixtures
// ============================================================================

pub fn auth_user_json() -> Value {
    json!({
        "id": "u-admin",
        "email": ADMIN_EMAIL,
        "full_name": "Ada Admin",
        "name": "Ada",
        "isEmailVerified": true,
        "isTwoFactorEnabled": false,
        "roles": ["admin"],
        "permissions": ["users:read", "users:write"],
        "createdAt": "2024-01-01T00:00:00Z",
        "updatedAt": "2024-05-01T12:00:00.250Z",
        "is_active": true
    })
}

pub fn managed_user_json(id: &str) -> Value {
    json!({
        "id": id,
        "email": format!("{id}@example.com"),
        "isActive": true,
        "isVerified": true,
        "isSuperuser": false,
        "isSuspended": false,
        "twoFactorEnabled": false,
        "roles": [{"id": "r1", "name": "user"}],
        "createdAt": "2024-01-01T00:00:00.000Z"
    })
}

pub fn session_json(id: &str) -> Value {
    json!({
        "id": id,
        "userId": "u1",
        "ipAddress": "203.0.113.7",
        "userAgent": "curl/8.0",
        "isActive": true,
        "createdAt": "2024-05-01T09:00:00Z",
        "lastActivity": "2024-05-01T09:30:00Z",
        "expiresAt": "2024-05-01T17:00:00Z"
    })
}

fn detail(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "detail": message }))).into_response()
}

fn is_authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {TEST_TOKEN}"))
}

fn token_expired() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "success": false,
            "error": {"code": "TOKEN_EXPIRED", "message": "Session expired"}
        })),
    )
        .into_response()
}

// ============================================================================
// Handlers
// ============================================================================

async fn login(
    State(state): State<StubState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    state.record("/auth/login", &headers, HashMap::new(), Some(body.clone()));

    if body["email"] != ADMIN_EMAIL || body["password"] != ADMIN_PASSWORD {
        return detail(StatusCode::UNAUTHORIZED, "Invalid email or password");
    }

    Json(json!({
        "success": true,
        "data": {
            "user": auth_user_json(),
            "accessToken": TEST_TOKEN,
            "refreshToken": "test-refresh-token",
            "tokenType": "bearer",
            "expiresIn": 900
        },
        "metadata": {"request_id": "srv-1", "version": "1.0.0"}
    }))
    .into_response()
}

async fn logout(State(state): State<StubState>, headers: HeaderMap) -> Response {
    state.record("/auth/logout", &headers, HashMap::new(), None);
    Json(json!({"message": "Logged out"})).into_response()
}

async fn me(State(state): State<StubState>, headers: HeaderMap) -> Response {
    state.record("/auth/me", &headers, HashMap::new(), None);
    if !is_authorized(&headers) {
        return token_expired();
    }
    Json(auth_user_json()).into_response()
}

async fn list_users(
    State(state): State<StubState>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    state.record("/admin/users", &headers, query, None);
    Json(json!([managed_user_json("u1"), managed_user_json("u2")])).into_response()
}

async fn get_user(
    State(state): State<StubState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    state.record(&format!("/admin/users/{id}"), &headers, HashMap::new(), None);
    if id == "missing" {
        return detail(StatusCode::NOT_FOUND, "User not found");
    }
    Json(managed_user_json(&id)).into_response()
}

async fn suspend_user(
    State(state): State<StubState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    state.record(
        &format!("/admin/users/{id}/suspend"),
        &headers,
        HashMap::new(),
        Some(body),
    );
    Json(json!({"message": format!("User {id} suspended")})).into_response()
}

async fn malformed_stats(State(state): State<StubState>, headers: HeaderMap) -> Response {
    state.record("/admin/stats", &headers, HashMap::new(), None);
    Json(json!({
        "users": "lots",
        "sessions": {},
        "organizations": {},
        "apiKeys": {},
        "auditLogs": {}
    }))
    .into_response()
}

async fn system_health(State(state): State<StubState>, headers: HeaderMap) -> Response {
    state.record("/admin/system/health", &headers, HashMap::new(), None);
    Json(json!({
        "success": true,
        "data": {
            "status": "degraded",
            "components": {
                "database": {"status": "healthy", "latencyMs": 3},
                "redis": {"status": "unhealthy", "error": "connection refused"}
            },
            "uptime": "1:00:00",
            "version": "1.4.2",
            "lastCheck": "2024-05-01T10:00:00Z"
        }
    }))
    .into_response()
}

async fn list_sessions(
    State(state): State<StubState>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    state.record("/sessions", &headers, query, None);
    Json(json!({
        "data": [session_json("s1")],
        "total": 21,
        "page": 1,
        "limit": 20,
        "hasNext": true,
        "hasPrevious": false
    }))
    .into_response()
}

async fn delete_webhook(
    State(state): State<StubState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> StatusCode {
    state.record(&format!("/webhooks/{id}"), &headers, HashMap::new(), None);
    StatusCode::NO_CONTENT
}

async fn test_webhook(
    State(state): State<StubState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    state.record(
        &format!("/webhooks/{id}/test"),
        &headers,
        HashMap::new(),
        Some(body),
    );
    if id == "w-quiet" {
        return Json(json!({"success": false})).into_response();
    }
    Json(json!({
        "success": false,
        "statusCode": 500,
        "responseTimeMs": 120,
        "error": "Endpoint returned 500"
    }))
    .into_response()
}

async fn delete_user(
    State(state): State<StubState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    state.record(&format!("/admin/users/{id}"), &headers, query.clone(), None);
    let hard = query.get("hard_delete").is_some_and(|v| v == "true");
    let message = format!(
        "User {} deleted successfully",
        if hard { "permanently" } else { "soft" }
    );
    Json(json!({ "message": message })).into_response()
}

async fn unsuspend_user(
    State(state): State<StubState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    state.record(
        &format!("/admin/users/{id}/unsuspend"),
        &headers,
        HashMap::new(),
        None,
    );
    Json(json!({
        "user_id": id,
        "suspended": false,
        "message": "User account unsuspended successfully"
    }))
    .into_response()
}

async fn terminate_session(
    State(state): State<StubState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    state.record(
        &format!("/admin/sessions/{id}/terminate"),
        &headers,
        HashMap::new(),
        None,
    );
    if id == "gone" {
        return detail(StatusCode::NOT_FOUND, "Session not found");
    }
    Json(json!({"message": "Session terminated successfully"})).into_response()
}

async fn terminate_all_sessions(
    State(state): State<StubState>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    state.record("/admin/sessions/terminate-all", &headers, query.clone(), None);
    let user_id = query.get("user_id").cloned().unwrap_or_default();
    Json(json!({
        "user_id": user_id,
        "terminated_count": 3,
        "message": "Terminated 3 sessions"
    }))
    .into_response()
}

async fn activity_report(
    State(state): State<StubState>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    state.record("/admin/activity-report", &headers, query, None);
    Json(json!({
        "periodDays": 7,
        "totalActions": 12,
        "actionsByType": {"USER_LOGIN": 9, "USER_UPDATED": 3},
        "dailyActivity": [{"date": "2024-05-01", "count": 12}],
        "mostActiveUsers": [{"user_id": "u1", "count": 9}]
    }))
    .into_response()
}

async fn webhook_stats(
    State(state): State<StubState>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    state.record("/webhooks/stats", &headers, query, None);
    Json(json!({
        "totalWebhooks": 2,
        "activeWebhooks": 1,
        "totalDeliveries": 40,
        "successfulDeliveries": 36,
        "failedDeliveries": 4,
        "averageSuccessRate": 90.0,
        "eventBreakdown": {"user.created": 30, "auth.login_failed": 10},
        "recentActivity": []
    }))
    .into_response()
}

async fn regenerate_secret(
    State(state): State<StubState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Response {
    state.record(
        &format!("/webhooks/{id}/regenerate-secret"),
        &headers,
        HashMap::new(),
        None,
    );
    Json(json!({
        "secret": "whsec_rotated0123456789",
        "message": "Webhook secret regenerated successfully"
    }))
    .into_response()
}

async fn retry_delivery(
    State(state): State<StubState>,
    headers: HeaderMap,
    Path((id, delivery_id)): Path<(String, String)>,
) -> Response {
    state.record(
        &format!("/webhooks/{id}/deliveries/{delivery_id}/retry"),
        &headers,
        HashMap::new(),
        None,
    );
    Json(json!({"message": "Webhook delivery queued for retry"})).into_response()
}
