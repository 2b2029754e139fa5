//! Analytics rollups.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::common::Severity;

wire_enum! {
    /// Window covered by an analytics query.
    #[derive(Default, PartialOrd, Ord)]
    pub enum TimeRange {
        LastHour => ("1h", "Last hour"),
        LastDay => ("1d", "Last 24 hours"),
        #[default]
        LastWeek => ("1w", "Last 7 days"),
        LastMonth => ("1m", "Last 30 days"),
        LastQuarter => ("3m", "Last 90 days"),
        LastYear => ("1y", "Last year"),
    }
}

impl TimeRange {
    pub fn duration(&self) -> Duration {
        match self {
            TimeRange::LastHour => Duration::hours(1),
            TimeRange::LastDay => Duration::days(1),
            TimeRange::LastWeek => Duration::weeks(1),
            TimeRange::LastMonth => Duration::days(30),
            TimeRange::LastQuarter => Duration::days(90),
            TimeRange::LastYear => Duration::days(365),
        }
    }

    /// Start of the window ending at `now`.
    pub fn start_from(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - self.duration()
    }
}

wire_enum! {
    pub enum MetricType {
        Counter => ("counter", "Counter"),
        Gauge => ("gauge", "Gauge"),
        Histogram => ("histogram", "Histogram"),
        Summary => ("summary", "Summary"),
    }
}

/// One sample of a time series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSeriesPoint {
    #[serde(with = "shared::iso8601")]
    pub timestamp: DateTime<Utc>,
    pub value: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Sum of the values of a series.
pub fn series_total(points: &[TimeSeriesPoint]) -> f64 {
    points.iter().map(|p| p.value).sum()
}

/// Point with the largest value; the earliest one wins ties.
pub fn series_peak(points: &[TimeSeriesPoint]) -> Option<&TimeSeriesPoint> {
    points.iter().fold(None, |best, p| match best {
        Some(b) if b.value >= p.value => Some(b),
        _ => Some(p),
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserGrowthAnalytics {
    pub total_users: u64,
    pub new_users: u64,
    pub active_users: u64,
    pub churned_users: u64,
    /// Percent change against the previous window.
    pub growth_rate: f64,
    pub retention_rate: f64,
    pub timeline: Vec<TimeSeriesPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthTrendAnalytics {
    pub total_logins: u64,
    pub successful_logins: u64,
    pub failed_logins: u64,
    pub success_rate: f64,
    pub mfa_usage_rate: f64,
    #[serde(default)]
    pub method_breakdown: HashMap<String, u64>,
    pub timeline: Vec<TimeSeriesPoint>,
}

/// A notable security event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityIncident {
    pub id: String,
    pub incident_type: String,
    pub severity: Severity,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(with = "shared::iso8601")]
    pub detected_at: DateTime<Utc>,
    pub resolved: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityIncidentAnalytics {
    pub total_incidents: u64,
    #[serde(default)]
    pub by_severity: HashMap<Severity, u64>,
    #[serde(default)]
    pub by_type: HashMap<String, u64>,
    pub blocked_ips: u64,
    pub recent_incidents: Vec<SecurityIncident>,
    pub timeline: Vec<TimeSeriesPoint>,
}

impl SecurityIncidentAnalytics {
    /// Unresolved incidents at or above `High`.
    pub fn open_alerts(&self) -> impl Iterator<Item = &SecurityIncident> {
        self.recent_incidents
            .iter()
            .filter(|i| !i.resolved && i.severity.is_alerting())
    }
}

/// Traffic of one API route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointUsage {
    pub endpoint: String,
    pub method: String,
    pub request_count: u64,
    pub error_count: u64,
    pub avg_response_time_ms: f64,
}

impl EndpointUsage {
    pub fn error_rate(&self) -> f64 {
        if self.request_count == 0 {
            0.0
        } else {
            self.error_count as f64 / self.request_count as f64
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiUsageAnalytics {
    pub total_requests: u64,
    pub error_rate: f64,
    pub avg_response_time_ms: f64,
    pub p95_response_time_ms: f64,
    pub top_endpoints: Vec<EndpointUsage>,
    pub timeline: Vec<TimeSeriesPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemPerformanceAnalytics {
    pub cpu_usage: f64,
    pub memory_usage: f64,
    pub disk_usage: f64,
    pub db_connections: u32,
    pub cache_hit_rate: f64,
    pub cpu_timeline: Vec<TimeSeriesPoint>,
    pub memory_timeline: Vec<TimeSeriesPoint>,
}

/// All rollups for one window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    pub time_range: TimeRange,
    #[serde(with = "shared::iso8601")]
    pub generated_at: DateTime<Utc>,
    pub user_growth: UserGrowthAnalytics,
    pub auth_trends: AuthTrendAnalytics,
    pub security_incidents: SecurityIncidentAnalytics,
    pub api_usage: ApiUsageAnalytics,
    pub system_performance: SystemPerformanceAnalytics,
}

/// Query for [`AnalyticsSummary`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnalyticsQuery {
    pub time_range: TimeRange,
    pub metric_type: Option<MetricType>,
}

impl AnalyticsQuery {
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("timeRange", self.time_range.to_string())];
        if let Some(metric) = self.metric_type {
            pairs.push(("metricType", metric.to_string()));
        }
        pairs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::WireRecord;
    use chrono::TimeZone;
    use serde_json::json;

    fn point(hour: u32, value: f64) -> TimeSeriesPoint {
        TimeSeriesPoint {
            timestamp: Utc.with_ymd_and_hms(2024, 5, 1, hour, 0, 0).unwrap(),
            value,
            label: None,
        }
    }

    #[test]
    fn test_time_range_wire_and_duration() {
        let range: TimeRange = serde_json::from_str("\"3m\"").unwrap();
        assert_eq!(range, TimeRange::LastQuarter);
        assert_eq!(range.duration(), Duration::days(90));
        assert_eq!(TimeRange::default().to_string(), "1w");
        assert!(serde_json::from_str::<TimeRange>("\"2w\"").is_err());

        let now = Utc.with_ymd_and_hms(2024, 5, 2, 0, 0, 0).unwrap();
        assert_eq!(
            TimeRange::LastDay.start_from(now),
            Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_series_helpers() {
        let points = vec![point(1, 2.0), point(2, 5.0), point(3, 5.0)];
        assert_eq!(series_total(&points), 12.0);
        assert_eq!(series_peak(&points), Some(&points[1]));
        assert_eq!(series_peak(&[]), None);
    }

    #[test]
    fn test_time_series_point_label_omitted() {
        let json = point(4, 1.5).to_json().unwrap();
        assert_eq!(json, json!({"timestamp": "2024-05-01T04:00:00.000Z", "value": 1.5}));
    }

    #[test]
    fn test_endpoint_error_rate() {
        let usage = EndpointUsage {
            endpoint: "/api/v1/auth/login".into(),
            method: "POST".into(),
            request_count: 200,
            error_count: 10,
            avg_response_time_ms: 35.0,
        };
        assert_eq!(usage.error_rate(), 0.05);
        let idle = EndpointUsage {
            request_count: 0,
            error_count: 0,
            ..usage
        };
        assert_eq!(idle.error_rate(), 0.0);
    }

    #[test]
    fn test_security_incident_open_alerts() {
        let analytics = SecurityIncidentAnalytics::from_json(json!({
            "totalIncidents": 2,
            "bySeverity": {"high": 1, "low": 1},
            "blockedIps": 1,
            "recentIncidents": [
                {
                    "id": "i1", "incidentType": "brute_force", "severity": "high",
                    "description": "Repeated failures", "ipAddress": "198.51.100.9",
                    "detectedAt": "2024-05-01T03:00:00Z", "resolved": false
                },
                {
                    "id": "i2", "incidentType": "new_device", "severity": "low",
                    "description": "Login from new device",
                    "detectedAt": "2024-05-01T04:00:00Z", "resolved": false
                }
            ],
            "timeline": []
        }))
        .unwrap();
        let open: Vec<&str> = analytics.open_alerts().map(|i| i.id.as_str()).collect();
        assert_eq!(open, vec!["i1"]);
        assert!(analytics.by_type.is_empty());
    }

    #[test]
    fn test_analytics_query_pairs() {
        let query = AnalyticsQuery {
            time_range: TimeRange::LastMonth,
            metric_type: Some(MetricType::Gauge),
        };
        assert_eq!(
            query.to_query(),
            vec![("timeRange", "1m".to_string()), ("metricType", "gauge".to_string())]
        );
    }
}
