//! Audit log models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::PageQuery;
use std::collections::HashMap;

use super::common::Severity;
use crate::codec::JsonValue;

/// A recorded administrative or security-relevant action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogEntry {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_email: Option<String>,
    /// Dotted action name, e.g. `user.login`.
    pub action: String,
    pub resource_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<Severity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(with = "shared::iso8601")]
    pub timestamp: DateTime<Utc>,
}

impl AuditLogEntry {
    /// Resource family of the action (`user` for `user.login`).
    pub fn action_category(&self) -> &str {
        self.action.split('.').next().unwrap_or(&self.action)
    }

    /// Entries without a success flag are treated as successful.
    pub fn is_failure(&self) -> bool {
        self.success == Some(false)
    }

    /// Reads a string out of the `details` object.
    pub fn detail_str(&self, key: &str) -> Option<&str> {
        self.details.as_ref()?.get(key)?.as_str()
    }
}

/// Filters for the audit log listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuditLogQuery {
    pub page: PageQuery,
    pub user_id: Option<String>,
    pub action: Option<String>,
    pub resource_type: Option<String>,
    pub resource_id: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

impl AuditLogQuery {
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut pairs = self.page.to_query();
        let text = [
            ("userId", &self.user_id),
            ("action", &self.action),
            ("resourceType", &self.resource_type),
            ("resourceId", &self.resource_id),
        ];
        for (key, value) in text {
            if let Some(value) = value {
                pairs.push((key, value.clone()));
            }
        }
        if let Some(start) = &self.start_date {
            pairs.push(("startDate", shared::iso8601::format(start)));
        }
        if let Some(end) = &self.end_date {
            pairs.push(("endDate", shared::iso8601::format(end)));
        }
        pairs
    }

    /// True when both bounds are set and the range is inverted.
    pub fn has_inverted_range(&self) -> bool {
        matches!((self.start_date, self.end_date), (Some(start), Some(end)) if start > end)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditStatistics {
    pub total_events: u64,
    #[serde(default)]
    pub events_by_action: HashMap<String, u64>,
    #[serde(default)]
    pub events_by_severity: HashMap<Severity, u64>,
}
