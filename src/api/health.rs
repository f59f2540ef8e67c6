//! Health summary of the monitored catalog.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::{DEGRADED_UPTIME_PCT, HEALTHY_UPTIME_PCT};
use crate::models::SiteRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub total_sites: usize,
    pub working: usize,
    pub down: usize,
    pub uptime_pct: f64,
    /// Mean latency over records with a recorded response time
    pub avg_response_ms: Option<f64>,
    /// Most recent check over all records
    pub last_checked: Option<DateTime<Utc>>,
    /// Active records that missed their check window
    pub overdue_sites: usize,
    pub sweep_running: bool,
}

impl HealthReport {
    /// Derives the report from a snapshot of all records.
    ///
    /// Uptime is active `WORKING` records over all records, so a paused site
    /// counts against it. An empty catalog is healthy with 0% uptime. Overdue
    /// records cap the status at `DEGRADED`.
    pub fn from_records(records: &[SiteRecord], overdue_sites: usize, sweep_running: bool) -> Self {
        let total_sites = records.len();
        let working = records
            .iter()
            .filter(|r| r.is_active && r.status.is_working())
            .count();
        let down = total_sites - working;

        let uptime_pct = if total_sites == 0 {
            0.0
        } else {
            working as f64 / total_sites as f64 * 100.0
        };

        let latencies: Vec<i64> = records.iter().filter_map(|r| r.response_time_ms).collect();
        let avg_response_ms = if latencies.is_empty() {
            None
        } else {
            Some(latencies.iter().sum::<i64>() as f64 / latencies.len() as f64)
        };

        let mut status = if total_sites == 0 || uptime_pct >= HEALTHY_UPTIME_PCT {
            HealthStatus::Healthy
        } else if uptime_pct >= DEGRADED_UPTIME_PCT {
            HealthStatus::Degraded
        } else {
            HealthStatus::Critical
        };
        if overdue_sites > 0 && status == HealthStatus::Healthy {
            status = HealthStatus::Degraded;
        }

        HealthReport {
            status,
            total_sites,
            working,
            down,
            uptime_pct,
            avg_response_ms,
            last_checked: records.iter().filter_map(|r| r.last_checked).max(),
            overdue_sites,
            sweep_running,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SiteStatus;

    fn record(status: SiteStatus, latency: Option<i64>) -> SiteRecord {
        SiteRecord {
            status,
            current_working_url: status.is_working().then(|| "https://movierulz.tv/".to_string()),
            response_time_ms: latency,
            last_checked: Some(Utc::now()),
            ..SiteRecord::detached("movierulz")
        }
    }

    fn report(working: usize, other: usize) -> HealthReport {
        let mut records = vec![record(SiteStatus::Working, Some(100)); working];
        records.extend(vec![record(SiteStatus::Down, None); other]);
        HealthReport::from_records(&records, 0, false)
    }

    #[test]
    fn test_empty_catalog_is_healthy() {
        let report = HealthReport::from_records(&[], 0, false);
        assert_eq!(report.status, HealthStatus::Healthy);
        assert_eq!(report.uptime_pct, 0.0);
        assert_eq!(report.avg_response_ms, None);
        assert_eq!(report.last_checked, None);
    }

    #[test]
    fn test_thresholds() {
        assert_eq!(report(4, 1).status, HealthStatus::Healthy);
        assert_eq!(report(3, 1).status, HealthStatus::Degraded);
        assert_eq!(report(1, 1).status, HealthStatus::Degraded);
        assert_eq!(report(1, 2).status, HealthStatus::Critical);
        assert_eq!(report(0, 3).status, HealthStatus::Critical);
    }

    #[test]
    fn test_counts_and_average() {
        let records = vec![
            record(SiteStatus::Working, Some(100)),
            record(SiteStatus::Working, Some(300)),
            record(SiteStatus::Error, None),
            record(SiteStatus::NotFound, None),
        ];
        let report = HealthReport::from_records(&records, 0, true);
        assert_eq!(report.total_sites, 4);
        assert_eq!(report.working, 2);
        assert_eq!(report.down, 2);
        assert_eq!(report.uptime_pct, 50.0);
        assert_eq!(report.avg_response_ms, Some(200.0));
        assert!(report.sweep_running);
    }

    #[test]
    fn test_paused_working_site_is_not_counted_as_working() {
        let mut paused = record(SiteStatus::Working, Some(100));
        paused.is_active = false;
        let records = vec![record(SiteStatus::Working, Some(100)), paused];

        let report = HealthReport::from_records(&records, 0, false);
        assert_eq!(report.total_sites, 2);
        assert_eq!(report.working, 1);
        assert_eq!(report.down, 1);
        assert_eq!(report.uptime_pct, 50.0);
        assert_eq!(report.status, HealthStatus::Degraded);
    }

    #[test]
    fn test_overdue_sites_degrade_a_healthy_catalog() {
        let records = vec![record(SiteStatus::Working, Some(100)); 5];
        let report = HealthReport::from_records(&records, 2, false);
        assert_eq!(report.status, HealthStatus::Degraded);
        assert_eq!(report.overdue_sites, 2);
    }

    #[test]
    fn test_serialized_status_name() {
        let json = serde_json::to_value(report(0, 1)).unwrap();
        assert_eq!(json["status"], "CRITICAL");
    }
}
