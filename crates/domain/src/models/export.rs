//! Data export jobs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::codec::JsonValue;

wire_enum! {
    pub enum ExportStatus {
        Pending => ("pending", "Pending"),
        Processing => ("processing", "Processing"),
        Completed => ("completed", "Completed"),
        Failed => ("failed", "Failed"),
        Expired => ("expired", "Expired"),
    }
}

impl ExportStatus {
    /// No further status change is expected from the server.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ExportStatus::Completed | ExportStatus::Failed | ExportStatus::Expired
        )
    }
}

wire_enum! {
    pub enum ExportFormat {
        Csv => ("csv", "CSV"),
        Json => ("json", "JSON"),
        Xlsx => ("xlsx", "Excel"),
        Parquet => ("parquet", "Parquet"),
        Pdf => ("pdf", "PDF"),
    }
}

impl ExportFormat {
    pub fn file_extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Parquet => "parquet",
            ExportFormat::Pdf => "pdf",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv",
            ExportFormat::Json => "application/json",
            ExportFormat::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            ExportFormat::Parquet => "application/vnd.apache.parquet",
            ExportFormat::Pdf => "application/pdf",
        }
    }
}

wire_enum! {
    /// Dataset being exported.
    pub enum ExportType {
        Users => ("users", "Users"),
        AuditLogs => ("audit_logs", "Audit logs"),
        Sessions => ("sessions", "Sessions"),
        LoginAttempts => ("login_attempts", "Login attempts"),
        WebhookDeliveries => ("webhook_deliveries", "Webhook deliveries"),
    }
}

/// Export tuning shared by requests and job records.
///
/// Flags the caller did not set are omitted on the wire; the server treats
/// them as off.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filters: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compress: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encrypt: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization_id: Option<String>,
}

impl ExportOptions {
    pub fn compresses(&self) -> bool {
        self.compress.unwrap_or(false)
    }

    pub fn encrypts(&self) -> bool {
        self.encrypt.unwrap_or(false)
    }
}

/// Request payload for starting an export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "validate_export_window"))]
pub struct CreateExportRequest {
    pub export_type: ExportType,
    pub format: ExportFormat,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<ExportOptions>,
    #[serde(
        default,
        with = "shared::iso8601::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(
        default,
        with = "shared::iso8601::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub end_date: Option<DateTime<Utc>>,
}

impl CreateExportRequest {
    pub fn new(export_type: ExportType, format: ExportFormat) -> Self {
        Self {
            export_type,
            format,
            options: None,
            start_date: None,
            end_date: None,
        }
    }
}

fn validate_export_window(request: &CreateExportRequest) -> Result<(), ValidationError> {
    if let (Some(start), Some(end)) = (request.start_date, request.end_date) {
        if start > end {
            let mut err = ValidationError::new("date_range");
            err.message = Some("Start date must be before end date".into());
            return Err(err);
        }
    }
    if let Some(columns) = request.options.as_ref().and_then(|o| o.columns.as_ref()) {
        if columns.iter().any(|c| c.trim().is_empty()) {
            let mut err = ValidationError::new("columns");
            err.message = Some("Column names must not be empty".into());
            return Err(err);
        }
    }
    Ok(())
}

/// Server-side export job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportJob {
    pub id: String,
    pub user_id: String,
    pub export_type: ExportType,
    pub format: ExportFormat,
    pub status: ExportStatus,
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
    #[serde(
        default,
        with = "shared::iso8601::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub expires_at: Option<DateTime<Utc>>,
    /// Percent complete, 0-100.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_size: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub options: ExportOptions,
}

impl ExportJob {
    /// Completed, has a download link and the link has not expired at `now`.
    pub fn is_downloadable(&self, now: DateTime<Utc>) -> bool {
        self.status == ExportStatus::Completed
            && self.download_url.is_some()
            && self.expires_at.map_or(true, |expires| now < expires)
    }

    /// File name to save the download under.
    pub fn suggested_file_name(&self) -> String {
        self.file_name.clone().unwrap_or_else(|| {
            format!(
                "{}-{}.{}",
                self.export_type,
                self.created_at.format("%Y%m%d%H%M%S"),
                self.format.file_extension()
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::WireRecord;
    use chrono::{Duration, TimeZone};
    use serde_json::json;

    fn job_json() -> serde_json::Value {
        json!({
            "id": "e1",
            "userId": "u1",
            "exportType": "audit_logs",
            "format": "csv",
            "status": "completed",
            "createdAt": "2024-05-01T08:00:00.000Z",
            "completedAt": "2024-05-01T08:02:00.000Z",
            "expiresAt": "2024-05-08T08:02:00.000Z",
            "progress": 100,
            "rowCount": 5120,
            "downloadUrl": "https://auth.example.com/exports/e1.csv",
            "options": {"compress": true, "encrypt": false}
        })
    }

    #[test]
    fn test_export_job_roundtrip_preserves_keys() {
        let job = ExportJob::from_json(job_json()).unwrap();
        assert_eq!(job.export_type, ExportType::AuditLogs);
        assert!(job.options.compresses() && !job.options.encrypts());
        assert_eq!(job.to_json().unwrap(), job_json());
    }

    #[test]
    fn test_export_job_keeps_absent_option_flags() {
        let mut json = job_json();
        json["options"] = json!({"columns": ["email"]});
        let job = ExportJob::from_json(json.clone()).unwrap();
        assert!(!job.options.compresses());
        assert_eq!(job.options.compress, None);
        assert_eq!(job.to_json().unwrap(), json);
    }

    #[test]
    fn test_export_job_bogus_status_fails() {
        let mut json = job_json();
        json["status"] = json!("bogus");
        let err = ExportJob::from_json(json).unwrap_err();
        assert!(err.is_decode());
    }

    #[test]
    fn test_export_job_downloadable() {
        let job = ExportJob::from_json(job_json()).unwrap();
        let now = Utc.with_ymd_and_hms(2024, 5, 2, 0, 0, 0).unwrap();
        assert!(job.is_downloadable(now));
        assert!(!job.is_downloadable(now + Duration::days(30)));

        let running = ExportJob {
            status: ExportStatus::Processing,
            ..job
        };
        assert!(!running.is_downloadable(now));
        assert!(!running.status.is_terminal());
    }

    #[test]
    fn test_suggested_file_name() {
        let job = ExportJob::from_json(job_json()).unwrap();
        assert_eq!(job.suggested_file_name(), "audit_logs-20240501080000.csv");
    }

    #[test]
    fn test_create_export_request_wire_format() {
        let request = CreateExportRequest {
            options: Some(ExportOptions {
                columns: Some(vec!["email".into(), "createdAt".into()]),
                ..Default::default()
            }),
            ..CreateExportRequest::new(ExportType::Users, ExportFormat::Xlsx)
        };
        assert_eq!(
            request.to_json().unwrap(),
            json!({
                "exportType": "users",
                "format": "xlsx",
                "options": {"columns": ["email", "createdAt"]}
            })
        );
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_create_export_request_window_validation() {
        let request = CreateExportRequest {
            start_date: Some(Utc.with_ymd_and_hms(2024, 5, 2, 0, 0, 0).unwrap()),
            end_date: Some(Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap()),
            ..CreateExportRequest::new(ExportType::Sessions, ExportFormat::Json)
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_export_format_metadata() {
        assert_eq!(ExportFormat::Xlsx.file_extension(), "xlsx");
        assert_eq!(ExportFormat::Pdf.mime_type(), "application/pdf");
    }
}
