//! User management models for administrators.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::validation::validate_password_strength;
use shared::{PageQuery, Patch};
use validator::Validate;

wire_enum! {
    /// Action applied to every user of a bulk operation.
    pub enum BulkAction {
        Suspend => ("suspend", "Suspend"),
        Unsuspend => ("unsuspend", "Unsuspend"),
        Activate => ("activate", "Activate"),
        Deactivate => ("deactivate", "Deactivate"),
        Delete => ("delete", "Delete"),
    }
}

impl BulkAction {
    /// Actions that need a reason recorded in the audit log.
    pub fn requires_reason(&self) -> bool {
        matches!(self, BulkAction::Suspend | BulkAction::Delete)
    }
}

/// Role reference embedded in user records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleSummary {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// User account as seen by an administrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserManagementResponse {
    pub id: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub is_active: bool,
    pub is_verified: bool,
    pub is_superuser: bool,
    pub is_suspended: bool,
    pub two_factor_enabled: bool,
    pub roles: Vec<RoleSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<String>,
    #[serde(with = "shared::iso8601")]
    pub created_at: DateTime<Utc>,
    #[serde(
        default,
        with = "shared::iso8601::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub last_login: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suspension_reason: Option<String>,
    #[serde(
        default,
        with = "shared::iso8601::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub suspended_until: Option<DateTime<Utc>>,
}

impl UserManagementResponse {
    /// Whether the suspension is still in force at `now`.
    ///
    /// A suspension without an end date is indefinite.
    pub fn is_currently_suspended(&self, now: DateTime<Utc>) -> bool {
        self.is_suspended && self.suspended_until.map_or(true, |until| now < until)
    }

    pub fn has_role(&self, name: &str) -> bool {
        self.roles.iter().any(|role| role.name == name)
    }
}

fn default_true() -> bool {
    true
}

/// Request payload for creating a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,

    #[validate(custom(function = "validate_password_strength"))]
    pub password: String,

    #[serde(default = "default_true")]
    pub is_active: bool,

    #[serde(default)]
    pub is_verified: bool,

    #[serde(default)]
    pub is_superuser: bool,

    #[serde(default)]
    pub roles: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<String>,
}

/// Request payload for updating a user. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 100, message = "Name must be 1-100 characters"))]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_verified: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_superuser: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub roles: Option<Vec<String>>,

    /// `null` moves the user out of their organization.
    #[serde(default, skip_serializing_if = "Patch::is_unset")]
    pub organization_id: Patch<String>,
}

/// Request payload for suspending a user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SuspendUserRequest {
    #[validate(length(min = 1, max = 500, message = "Reason must be 1-500 characters"))]
    pub reason: String,

    #[serde(
        default,
        with = "shared::iso8601::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub until: Option<DateTime<Utc>>,
}

/// Acknowledgement of lifting a suspension. Keys are snake_case on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnsuspendUserResult {
    pub user_id: String,
    pub suspended: bool,
    pub message: String,
}

/// Applies one action to many users.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_bulk_operation"))]
pub struct BulkUserOperation {
    #[validate(length(min = 1, max = 100, message = "Between 1 and 100 users per operation"))]
    pub user_ids: Vec<String>,

    pub action: BulkAction,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

fn validate_bulk_operation(op: &BulkUserOperation) -> Result<(), validator::ValidationError> {
    let missing_reason = op.reason.as_deref().map_or(true, |r| r.trim().is_empty());
    if op.action.requires_reason() && missing_reason {
        let mut err = validator::ValidationError::new("reason_required");
        err.message = Some(format!("A reason is required to {} users", op.action).into());
        return Err(err);
    }
    Ok(())
}

/// Per-user failure of a bulk operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkFailure {
    pub user_id: String,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkOperationResult {
    pub succeeded: Vec<String>,
    pub failed: Vec<BulkFailure>,
}

impl BulkOperationResult {
    pub fn is_complete_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Filters for the user list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserListQuery {
    pub page: PageQuery,
    pub search: Option<String>,
    pub is_active: Option<bool>,
    pub role: Option<String>,
}

impl UserListQuery {
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut pairs = self.page.to_query();
        if let Some(search) = self.search.as_ref().filter(|s| !s.is_empty()) {
            pairs.push(("search", search.clone()));
        }
        if let Some(active) = self.is_active {
            pairs.push(("isActive", active.to_string()));
        }
        if let Some(role) = &self.role {
            pairs.push(("role", role.clone()));
        }
        pairs
    }
}
