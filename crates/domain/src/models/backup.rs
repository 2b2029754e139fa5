//! Backup and restore jobs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

wire_enum! {
    /// Status of a backup or restore job.
    pub enum JobStatus {
        Pending => ("pending", "Pending"),
        Running => ("running", "Running"),
        Completed => ("completed", "Completed"),
        Failed => ("failed", "Failed"),
        Cancelled => ("cancelled", "Cancelled"),
    }
}

impl JobStatus {
    /// No further status change is expected from the server.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Completed | JobStatus::Failed | JobStatus::Cancelled
        )
    }
}

wire_enum! {
    pub enum BackupType {
        Full => ("full", "Full"),
        Incremental => ("incremental", "Incremental"),
        Differential => ("differential", "Differential"),
        SchemaOnly => ("schema_only", "Schema only"),
        DataOnly => ("data_only", "Data only"),
    }
}

/// Backup flags. Unset flags are left to the server and stay unset when a
/// job record is re-encoded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupOptions {
    /// Restrict the backup to these tables; all tables when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tables: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compress: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encrypt: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verify: Option<bool>,
}

impl BackupOptions {
    pub fn compresses(&self) -> bool {
        self.compress.unwrap_or(true)
    }

    pub fn encrypts(&self) -> bool {
        self.encrypt.unwrap_or(false)
    }

    pub fn verifies(&self) -> bool {
        self.verify.unwrap_or(true)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateBackupRequest {
    pub backup_type: BackupType,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 500, message = "Description must be at most 500 characters"))]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<BackupOptions>,
}

/// Server-side backup job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupJob {
    pub id: String,
    pub user_id: String,
    pub backup_type: BackupType,
    pub status: JobStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(with = "shared::iso8601")]
    pub created_at: DateTime<Utc>,
    #[serde(
        default,
        with = "shared::iso8601::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        with = "shared::iso8601::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_size: Option<u64>,
    /// Hex SHA-256 of the backup file.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checksum: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub options: BackupOptions,
}

impl BackupJob {
    /// A completed backup with a checksum can be restored.
    pub fn is_restorable(&self) -> bool {
        self.status == JobStatus::Completed && self.checksum.is_some()
    }

    /// Wall-clock duration once both ends are known.
    pub fn elapsed(&self) -> Option<chrono::Duration> {
        Some(self.completed_at? - self.started_at?)
    }

    /// Compares a locally computed SHA-256 against the recorded checksum.
    pub fn checksum_matches(&self, file_bytes: &[u8]) -> bool {
        let actual = shared::crypto::sha256_hex(file_bytes);
        self.checksum
            .as_deref()
            .is_some_and(|expected| expected.eq_ignore_ascii_case(&actual))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoreOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tables: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drop_existing: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verify_checksum: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dry_run: Option<bool>,
}

impl RestoreOptions {
    pub fn drops_existing(&self) -> bool {
        self.drop_existing.unwrap_or(false)
    }

    pub fn verifies_checksum(&self) -> bool {
        self.verify_checksum.unwrap_or(true)
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run.unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateRestoreRequest {
    #[validate(length(min = 1, message = "Backup id is required"))]
    pub backup_id: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<RestoreOptions>,
}

/// Server-side restore job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoreJob {
    pub id: String,
    pub backup_id: String,
    pub user_id: String,
    pub status: JobStatus,
    #[serde(with = "shared::iso8601")]
    pub created_at: DateTime<Utc>,
    #[serde(
        default,
        with = "shared::iso8601::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        with = "shared::iso8601::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tables_restored: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub options: RestoreOptions,
}
