//! Backend paths, relative to the configured API prefix.

// Auth
pub const AUTH_LOGIN: &str = "/auth/login";
pub const AUTH_REGISTER: &str = "/auth/register";
pub const AUTH_REFRESH: &str = "/auth/refresh";
pub const AUTH_LOGOUT: &str = "/auth/logout";
pub const AUTH_FORGOT_PASSWORD: &str = "/auth/forgot-password";
pub const AUTH_RESET_PASSWORD: &str = "/auth/reset-password";
pub const AUTH_ME: &str = "/auth/me";
pub const TWO_FACTOR_VERIFY: &str = "/two-factor/verify";
pub const TWO_FACTOR_LOGIN: &str = "/two-factor/login";

// Profile
pub const PROFILE_ME: &str = "/profile/me";
pub const PROFILE_CHANGE_PASSWORD: &str = "/profile/change-password";

// Admin
pub const ADMIN_USERS: &str = "/admin/users";
pub const ADMIN_USERS_BULK: &str = "/admin/users/bulk-operation";
pub const ADMIN_DASHBOARD: &str = "/admin/dashboard";
pub const ADMIN_STATS: &str = "/admin/stats";
pub const ADMIN_SECURITY_REPORT: &str = "/admin/security-report";
pub const ADMIN_ACTIVITY_REPORT: &str = "/admin/activity-report";
pub const ADMIN_SESSIONS: &str = "/admin/sessions";
pub const ADMIN_SESSIONS_TERMINATE_ALL: &str = "/admin/sessions/terminate-all";
pub const ADMIN_SYSTEM_HEALTH: &str = "/admin/system/health";
pub const ADMIN_LOGIN_HISTORY: &str = "/admin/login-history";
pub const ADMIN_EXPORTS: &str = "/admin/exports";
pub const ADMIN_BACKUPS: &str = "/admin/backups";
pub const ADMIN_RESTORES: &str = "/admin/restores";

// Sessions and audit
pub const SESSIONS: &str = "/sessions";
pub const SESSIONS_REVOKE: &str = "/sessions/revoke";
pub const AUDIT_LOGS: &str = "/audit/logs";

pub const ANALYTICS: &str = "/analytics";

// Webhooks
pub const WEBHOOKS: &str = "/webhooks";
pub const WEBHOOK_EVENTS: &str = "/webhooks/events";
pub const WEBHOOK_STATS: &str = "/webhooks/stats";

pub fn admin_user(user_id: &str) -> String {
    format!("{ADMIN_USERS}/{user_id}")
}

pub fn admin_user_suspend(user_id: &str) -> String {
    format!("{ADMIN_USERS}/{user_id}/suspend")
}

pub fn admin_user_unsuspend(user_id: &str) -> String {
    format!("{ADMIN_USERS}/{user_id}/unsuspend")
}

pub fn admin_session_terminate(session_id: &str) -> String {
    format!("{ADMIN_SESSIONS}/{session_id}/terminate")
}

pub fn admin_export(export_id: &str) -> String {
    format!("{ADMIN_EXPORTS}/{export_id}")
}

pub fn admin_backup(backup_id: &str) -> String {
    format!("{ADMIN_BACKUPS}/{backup_id}")
}

pub fn admin_restore(restore_id: &str) -> String {
    format!("{ADMIN_RESTORES}/{restore_id}")
}

pub fn webhook(webhook_id: &str) -> String {
    format!("{WEBHOOKS}/{webhook_id}")
}

pub fn webhook_test(webhook_id: &str) -> String {
    format!("{WEBHOOKS}/{webhook_id}/test")
}

pub fn webhook_deliveries(webhook_id: &str) -> String {
    format!("{WEBHOOKS}/{webhook_id}/deliveries")
}

pub fn webhook_delivery_retry(webhook_id: &str, delivery_id: &str) -> String {
    format!("{WEBHOOKS}/{webhook_id}/deliveries/{delivery_id}/retry")
}

pub fn webhook_regenerate_secret(webhook_id: &str) -> String {
    format!("{WEBHOOKS}/{webhook_id}/regenerate-secret")
}
