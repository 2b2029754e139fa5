//! API request and response models.

pub mod admin_user;
pub mod analytics;
pub mod audit_log;
pub mod auth;
pub mod backup;
pub mod common;
pub mod dashboard;
pub mod envelope;
pub mod export;
pub mod profile;
pub mod session;
pub mod webhook;

pub use admin_user::{BulkAction, UserManagementResponse};
pub use analytics::{AnalyticsSummary, TimeRange};
pub use audit_log::AuditLogEntry;
pub use auth::{AuthResponse, AuthUser};
pub use backup::{BackupJob, JobStatus, RestoreJob};
pub use common::Severity;
pub use dashboard::{HealthStatus, SystemHealth};
pub use envelope::{ApiErrorBody, ApiResponse, ErrorCode, MessageResponse};
pub use export::{ExportJob, ExportStatus};
pub use profile::Profile;
pub use session::UserSession;
pub use webhook::{Webhook, WebhookDelivery};
