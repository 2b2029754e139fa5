//! Administrative dashboard aggregates, reports and system health.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::common::Severity;
use crate::codec::JsonValue;
use crate::labels::WireEnum;

wire_enum! {
    /// Overall or per-component health.
    #[derive(PartialOrd, Ord)]
    pub enum HealthStatus {
        Healthy => ("healthy", "Healthy"),
        Degraded => ("degraded", "Degraded"),
        Unhealthy => ("unhealthy", "Unhealthy"),
    }
}

wire_enum! {
    /// Kind of security rule.
    pub enum RuleType {
        IpAllowlist => ("ip_allowlist", "IP allowlist"),
        IpBlocklist => ("ip_blocklist", "IP blocklist"),
        RateLimit => ("rate_limit", "Rate limit"),
        GeoBlock => ("geo_block", "Geo block"),
        FailedLoginLockout => ("failed_login_lockout", "Failed login lockout"),
    }
}

/// Name to count maps per subsystem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemStats {
    pub users: HashMap<String, i64>,
    pub sessions: HashMap<String, i64>,
    pub organizations: HashMap<String, i64>,
    pub api_keys: HashMap<String, i64>,
    pub audit_logs: HashMap<String, i64>,
}

impl SystemStats {
    /// Looks up `users.total` style counters.
    pub fn count(&self, group: &str, name: &str) -> Option<i64> {
        let map = match group {
            "users" => &self.users,
            "sessions" => &self.sessions,
            "organizations" => &self.organizations,
            "apiKeys" => &self.api_keys,
            "auditLogs" => &self.audit_logs,
            _ => return None,
        };
        map.get(name).copied()
    }
}

/// Landing page data for the admin console.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminDashboardData {
    pub total_users: u64,
    pub active_users: u64,
    pub suspended_users: u64,
    pub active_sessions: u64,
    pub recent_registrations: u64,
    pub failed_login_attempts: u64,
    pub role_distribution: HashMap<String, u64>,
    pub recent_audit_logs: Vec<JsonValue>,
    pub system_health: HashMap<String, JsonValue>,
}

impl AdminDashboardData {
    /// Share of accounts that are active, in percent.
    pub fn active_ratio(&self) -> f64 {
        if self.total_users == 0 {
            return 0.0;
        }
        self.active_users as f64 * 100.0 / self.total_users as f64
    }
}

/// Audit activity over a window of `period_days`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserActivityReport {
    pub period_days: u32,
    pub total_actions: u64,
    pub actions_by_type: HashMap<String, u64>,
    pub daily_activity: Vec<JsonValue>,
    pub most_active_users: Vec<JsonValue>,
}

impl UserActivityReport {
    /// Action types ordered by count, highest first, ties by name.
    pub fn top_actions(&self, limit: usize) -> Vec<(&str, u64)> {
        let mut actions: Vec<(&str, u64)> = self
            .actions_by_type
            .iter()
            .map(|(action, count)| (action.as_str(), *count))
            .collect();
        actions.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        actions.truncate(limit);
        actions
    }
}

/// Security posture over a window of `period_days`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityReport {
    pub period_days: u32,
    pub failed_login_attempts: u64,
    pub suspicious_ips: Vec<JsonValue>,
    pub locked_accounts: u64,
    /// Percentage of active users with two-factor enabled.
    pub two_fa_adoption_rate: f64,
    pub recent_security_events: Vec<JsonValue>,
}

impl SecurityReport {
    /// IP strings of the suspicious-IP entries that carry one.
    pub fn suspicious_ip_addresses(&self) -> Vec<&str> {
        self.suspicious_ips
            .iter()
            .filter_map(|entry| match entry {
                JsonValue::String(ip) => Some(ip.as_str()),
                other => other.get("ip").and_then(JsonValue::as_str),
            })
            .collect()
    }
}

/// Health snapshot of the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemHealth {
    pub status: HealthStatus,
    pub components: HashMap<String, JsonValue>,
    /// Human-readable uptime as the backend formats it (`"3 days, 4:00:00"`).
    pub uptime: String,
    pub version: String,
    #[serde(with = "shared::iso8601")]
    pub last_check: DateTime<Utc>,
}

impl SystemHealth {
    /// Health of one component, when its detail carries a known `status`.
    pub fn component_status(&self, name: &str) -> Option<HealthStatus> {
        self.components
            .get(name)?
            .get("status")?
            .as_str()?
            .parse()
            .ok()
    }

    /// Components not reporting `healthy`, sorted by name.
    ///
    /// A component whose detail has no recognizable status counts as
    /// unhealthy.
    pub fn unhealthy_components(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .components
            .keys()
            .filter(|name| self.component_status(name) != Some(HealthStatus::Healthy))
            .map(String::as_str)
            .collect();
        names.sort_unstable();
        names
    }

    pub fn is_healthy(&self) -> bool {
        self.status == HealthStatus::Healthy
    }

    /// One line suitable for a status bar.
    pub fn summary(&self) -> String {
        format!("{} (v{}, up {})", self.status.label(), self.version, self.uptime)
    }
}

/// A configured security rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityRule {
    pub id: String,
    pub name: String,
    pub rule_type: RuleType,
    pub enabled: bool,
    pub severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config: Option<JsonValue>,
    #[serde(with = "shared::iso8601")]
    pub created_at: DateTime<Utc>,
    #[serde(
        default,
        with = "shared::iso8601::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<DateTime<Utc>>,
}
