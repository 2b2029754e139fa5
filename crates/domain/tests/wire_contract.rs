//! Cross-model checks of the JSON wire contract.
//!
//! Run with: cargo test -p domain --test wire_contract

use chrono::{TimeZone, Utc};
use domain::models::admin_user::UserManagementResponse;
use domain::models::dashboard::{
    AdminDashboardData, HealthStatus, SecurityReport, SystemHealth, UserActivityReport,
};
use domain::models::backup::{BackupJob, CreateBackupRequest, JobStatus};
use domain::models::export::ExportJob;
use domain::models::session::UserSession;
use domain::models::webhook::{
    DeliveryStatus, Webhook, WebhookDelivery, WebhookEventType, WebhookStats, WebhookStatus,
};
use domain::{WireEnum, WireRecord};
use serde_json::{json, Value};
use shared::Page;
use std::collections::BTreeSet;

fn user_management_example() -> Value {
    json!({
        "id": "u1",
        "email": "a@b.com",
        "isActive": true,
        "isVerified": false,
        "isSuperuser": false,
        "isSuspended": false,
        "twoFactorEnabled": false,
        "roles": [],
        "createdAt": "2024-01-01T00:00:00.000Z"
    })
}

/// Renames top-level snake_case keys the way `rename_all = "camelCase"` does.
fn camel_case_keys(value: Value) -> Value {
    let Value::Object(map) = value else {
        return value;
    };
    let renamed = map
        .into_iter()
        .map(|(key, value)| {
            let mut parts = key.split('_');
            let mut camel = parts.next().unwrap_or_default().to_string();
            for part in parts {
                let mut chars = part.chars();
                if let Some(first) = chars.next() {
                    camel.extend(first.to_uppercase());
                    camel.push_str(chars.as_str());
                }
            }
            (camel, value)
        })
        .collect();
    Value::Object(renamed)
}

fn keys(value: &Value) -> BTreeSet<String> {
    value
        .as_object()
        .map(|map| map.keys().cloned().collect())
        .unwrap_or_default()
}

// ============================================================================
// Decode / re-encode
// ============================================================================

#[test]
fn test_user_management_example_reencodes_same_keys() {
    let input = user_management_example();
    let user = UserManagementResponse::from_json(input.clone()).unwrap();

    assert!(user.name.is_none());
    assert!(user.organization_id.is_none());
    assert!(user.last_login.is_none());
    assert!(user.suspension_reason.is_none());
    assert!(user.suspended_until.is_none());

    let output = user.to_json().unwrap();
    assert_eq!(keys(&output), keys(&input));
    assert_eq!(output, input);
}

#[test]
fn test_every_required_key_is_required() {
    let input = user_management_example();
    for key in keys(&input) {
        let mut broken = input.clone();
        broken.as_object_mut().unwrap().remove(&key);
        assert!(
            UserManagementResponse::from_json(broken).is_err(),
            "decoding without {key} should fail"
        );
    }
}

#[test]
fn test_wrong_type_for_required_field_fails() {
    let mut input = user_management_example();
    input["id"] = json!(1);
    let err = UserManagementResponse::from_json(input).unwrap_err();
    assert_eq!(err.record(), "UserManagementResponse");
}

#[test]
fn test_wrong_type_for_optional_field_fails() {
    let mut input = user_management_example();
    input["suspendedUntil"] = json!(12345);
    assert!(UserManagementResponse::from_json(input).is_err());
}

#[test]
fn test_explicit_null_optional_decodes_as_absent() {
    let mut input = user_management_example();
    input["name"] = Value::Null;
    let user = UserManagementResponse::from_json(input).unwrap();
    assert!(user.name.is_none());
    assert!(!keys(&user.to_json().unwrap()).contains("name"));
}

// ============================================================================
// Enumerations
// ============================================================================

#[test]
fn test_bogus_job_status_fails() {
    let job = json!({
        "id": "b1",
        "userId": "u1",
        "backupType": "full",
        "status": "bogus",
        "createdAt": "2024-01-01T00:00:00Z",
        "options": {}
    });
    assert!(BackupJob::from_json(job).is_err());
    assert!("bogus".parse::<JobStatus>().is_err());
}

#[test]
fn test_job_status_decode_is_total() {
    for status in JobStatus::ALL {
        let decoded: JobStatus = serde_json::from_value(json!(status.as_str())).unwrap();
        assert_eq!(&decoded, status);
        assert_eq!(status.as_str().parse::<JobStatus>().unwrap(), *status);
    }
}

// ============================================================================
// Partial update
// ============================================================================

#[test]
fn test_partial_update_changes_only_overridden_fields() {
    let source = UserManagementResponse::from_json(user_management_example()).unwrap();
    let updated = UserManagementResponse {
        is_suspended: true,
        suspension_reason: Some("Chargeback".into()),
        ..source.clone()
    };

    let before = source.to_json_map().unwrap();
    let after = updated.to_json_map().unwrap();
    let changed: BTreeSet<&str> = after
        .iter()
        .filter(|(k, v)| before.get(*k) != Some(*v))
        .map(|(k, _)| k.as_str())
        .collect();
    assert_eq!(changed, BTreeSet::from(["isSuspended", "suspensionReason"]));
    assert!(!source.is_suspended);
}

// ============================================================================
// Pages
// ============================================================================

#[test]
fn test_page_of_sessions_decodes() {
    let page = Page::<UserSession>::from_json(json!({
        "items": [{
            "id": "s1",
            "userId": "u1",
            "ipAddress": "203.0.113.7",
            "userAgent": "curl/8.0",
            "isActive": true,
            "createdAt": "2024-05-01T09:00:00Z",
            "lastActivity": "2024-05-01T09:30:00Z",
            "expiresAt": "2024-05-01T17:00:00Z"
        }],
        "total": 21,
        "page": 1,
        "limit": 20,
        "hasNext": true,
        "hasPrevious": false
    }))
    .unwrap();
    assert_eq!(page.items.len(), 1);
    assert!(page.check().is_ok());
    assert_eq!(page.total_pages(), 2);
}

#[test]
fn test_page_with_malformed_item_fails() {
    let result = Page::<ExportJob>::from_json(json!({
        "data": [{"id": "e1"}],
        "total": 1,
        "page": 1,
        "limit": 20,
        "hasNext": false,
        "hasPrevious": false
    }));
    assert!(result.is_err());
}

// ============================================================================
// Minimal and populated round trips
// ============================================================================

#[test]
fn test_minimal_roundtrips() {
    let webhook = Webhook::default();
    assert_eq!(Webhook::from_json(webhook.to_json().unwrap()).unwrap(), webhook);

    let delivery = WebhookDelivery::default();
    assert_eq!(
        WebhookDelivery::from_json(delivery.to_json().unwrap()).unwrap(),
        delivery
    );

    let request = CreateBackupRequest::from_json(json!({"backupType": "incremental"})).unwrap();
    assert_eq!(request.to_json().unwrap(), json!({"backupType": "incremental"}));
}

#[test]
fn test_sub_millisecond_timestamps_roundtrip() {
    let session = UserSession {
        id: "s1".into(),
        user_id: "u1".into(),
        user_email: Some("a@b.com".into()),
        ip_address: "203.0.113.7".into(),
        user_agent: "curl/8.0".into(),
        device_type: None,
        device_name: None,
        location: None,
        is_active: true,
        created_at: Utc.timestamp_opt(1_714_554_000, 123_456_789).unwrap(),
        last_activity: Utc.timestamp_opt(1_714_554_100, 0).unwrap(),
        expires_at: Utc.timestamp_opt(1_714_583_000, 500_000).unwrap(),
    };
    let json = session.to_json().unwrap();
    assert_eq!(json["createdAt"], "2024-05-01T09:00:00.123456789Z");
    assert_eq!(json["expiresAt"], "2024-05-01T17:03:20.000500Z");
    assert_eq!(UserSession::from_json(json).unwrap(), session);
}

// ============================================================================
// Backend-shaped payloads
//
// Field sets below follow the backend's response models one to one, written
// with its snake_case names and renamed to the console's camelCase.
// ============================================================================

fn assert_same_keys<T: WireRecord>(input: &Value) -> T {
    let record = T::from_json(input.clone()).unwrap();
    assert_eq!(keys(&record.to_json().unwrap()), keys(input));
    record
}

#[test]
fn test_backend_dashboard_payload() {
    let input = camel_case_keys(json!({
        "total_users": 120,
        "active_users": 90,
        "suspended_users": 4,
        "active_sessions": 37,
        "recent_registrations": 12,
        "failed_login_attempts": 9,
        "role_distribution": {"admin": 2, "user": 118},
        "recent_audit_logs": [{"id": "a1", "action": "USER_LOGIN"}],
        "system_health": {"database": "healthy", "redis": "healthy"}
    }));
    let dashboard: AdminDashboardData = assert_same_keys(&input);
    assert_eq!(dashboard.active_ratio(), 75.0);
    assert_eq!(dashboard.role_distribution["user"], 118);
}

#[test]
fn test_backend_activity_and_security_payloads() {
    let activity = camel_case_keys(json!({
        "period_days": 30,
        "total_actions": 410,
        "actions_by_type": {"USER_LOGIN": 300, "USER_UPDATED": 110},
        "daily_activity": [{"date": "2024-05-01", "count": 14}],
        "most_active_users": [{"user_id": "u1", "count": 52}]
    }));
    let report: UserActivityReport = assert_same_keys(&activity);
    assert_eq!(report.top_actions(1), vec![("USER_LOGIN", 300)]);

    let security = camel_case_keys(json!({
        "period_days": 7,
        "failed_login_attempts": 23,
        "suspicious_ips": [{"ip": "198.51.100.4", "attempts": 11}],
        "locked_accounts": 2,
        "two_fa_adoption_rate": 41.5,
        "recent_security_events": [{"event": "auth.account_locked"}]
    }));
    assert!(security.get("twoFaAdoptionRate").is_some());
    let report: SecurityReport = assert_same_keys(&security);
    assert_eq!(report.suspicious_ip_addresses(), vec!["198.51.100.4"]);
}

#[test]
fn test_backend_health_payload() {
    let input = camel_case_keys(json!({
        "status": "degraded",
        "components": {
            "database": {"status": "healthy", "response_time": 2.1},
            "redis": {"status": "unhealthy", "error": "timeout"}
        },
        "uptime": "3 days, 4:05:06",
        "version": "1.0.0",
        "last_check": "2024-05-01T10:00:00.000Z"
    }));
    let health: SystemHealth = assert_same_keys(&input);
    assert_eq!(health.status, HealthStatus::Degraded);
    assert_eq!(health.unhealthy_components(), vec!["redis"]);
    assert_eq!(health.to_json().unwrap(), input);
}

#[test]
fn test_backend_webhook_payload() {
    let input = camel_case_keys(json!({
        "id": "w1",
        "name": "CRM sync",
        "url": "https://crm.example.com/hooks/auth",
        "description": "Pushes account changes",
        "events": ["user.created", "auth.login_failed", "organization.member_added"],
        "status": "error",
        "headers": {"X-Source": "auth"},
        "timeout": 15,
        "retry_count": 3,
        "is_active": true,
        "created_at": "2024-03-01T00:00:00.000Z",
        "updated_at": "2024-03-02T00:00:00.000Z",
        "last_delivery": "2024-03-02T08:00:00.000Z",
        "delivery_success_rate": 87.5,
        "total_deliveries": 8
    }));
    let webhook: Webhook = assert_same_keys(&input);
    assert_eq!(webhook.status, Some(WebhookStatus::Error));
    assert!(webhook.subscribes_to(WebhookEventType::LoginFailed));
    assert_eq!(webhook.effective_timeout(), 15);
    assert_eq!(webhook.success_rate(), Some(0.875));
    assert_eq!(webhook.to_json().unwrap(), input);
}

#[test]
fn test_backend_delivery_payload() {
    let input = camel_case_keys(json!({
        "id": "d1",
        "webhook_id": "w1",
        "event_type": "auth.2fa_enabled",
        "payload": {"user_id": "u1"},
        "status": "sending",
        "http_status": 202,
        "response_body": "accepted",
        "attempt_count": 1,
        "created_at": "2024-03-02T08:00:00.000Z"
    }));
    let delivery: WebhookDelivery = assert_same_keys(&input);
    assert_eq!(delivery.status, Some(DeliveryStatus::Sending));
    assert_eq!(delivery.event_type, Some(WebhookEventType::TwoFactorEnabled));
    assert_eq!(delivery.response_status(), Some(202));
    assert!(delivery.is_success_status());
}

#[test]
fn test_backend_webhook_stats_payload() {
    let input = camel_case_keys(json!({
        "total_webhooks": 5,
        "active_webhooks": 4,
        "total_deliveries": 200,
        "successful_deliveries": 190,
        "failed_deliveries": 10,
        "average_success_rate": 95.0,
        "event_breakdown": {"user.created": 150, "session.revoked": 50},
        "recent_activity": [{"date": "2024-05-01", "deliveries": 20}]
    }));
    let stats: WebhookStats = assert_same_keys(&input);
    assert_eq!(stats.deliveries_for(WebhookEventType::SessionRevoked), 50);
    assert_eq!(stats.to_json().unwrap(), input);
}

#[test]
fn test_every_backend_event_name_decodes() {
    let names = [
        "user.created", "user.updated", "user.deleted", "user.activated",
        "user.deactivated", "user.login", "user.logout", "user.password_changed",
        "user.email_verified", "auth.login_success", "auth.login_failed", "auth.logout",
        "auth.password_reset", "auth.2fa_enabled", "auth.2fa_disabled",
        "auth.account_locked", "auth.suspicious_activity", "session.created",
        "session.expired", "session.revoked", "api_key.created", "api_key.revoked",
        "api_key.expired", "api_key.rate_limited", "organization.created",
        "organization.updated", "organization.member_added", "organization.member_removed",
        "organization.role_changed", "role.assigned", "role.revoked", "permission.granted",
        "permission.revoked", "security.alert", "security.breach_detected",
        "security.compliance_violation", "system.maintenance", "system.error",
        "system.backup_completed", "custom.event",
    ];
    let decoded: Vec<WebhookEventType> =
        serde_json::from_value(json!(names[..])).expect("backend event names");
    assert_eq!(decoded.len(), WebhookEventType::ALL.len());
    for (event, name) in decoded.iter().zip(names) {
        assert_eq!(event.as_str(), name);
    }
}
