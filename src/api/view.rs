//! Transport shapes returned by the façade.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{SiteRecord, SiteStatus};

/// Public view of a site, without diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SiteView {
    pub id: i64,
    pub name: String,
    pub current_working_url: Option<String>,
    pub status: SiteStatus,
    pub last_checked: Option<DateTime<Utc>>,
    pub last_updated: Option<DateTime<Utc>>,
    pub response_time_ms: Option<i64>,
    pub is_active: bool,
}

impl From<&SiteRecord> for SiteView {
    fn from(record: &SiteRecord) -> Self {
        SiteView {
            id: record.id.unwrap_or_default(),
            name: record.name.clone(),
            current_working_url: record.current_working_url.clone(),
            status: record.status,
            last_checked: record.last_checked,
            last_updated: record.last_updated,
            response_time_ms: record.response_time_ms,
            is_active: record.is_active,
        }
    }
}

/// A single site including its notes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SiteDetail {
    #[serde(flatten)]
    pub site: SiteView,
    pub notes: Option<String>,
}

impl From<&SiteRecord> for SiteDetail {
    fn from(record: &SiteRecord) -> Self {
        SiteDetail {
            site: SiteView::from(record),
            notes: record.notes.clone(),
        }
    }
}

/// Operator edit of a stored site; absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SiteUpdate {
    pub current_working_url: Option<String>,
    pub status: Option<SiteStatus>,
    pub is_active: Option<bool>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statistics {
    pub total_sites: u64,
    pub status_distribution: BTreeMap<SiteStatus, u64>,
    /// Sites whose URL changed in the last 24 hours, newest first
    pub recently_updated: Vec<SiteView>,
}

/// Acknowledgement of a background sweep request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RefreshAck {
    pub accepted: bool,
    pub sites: usize,
}
