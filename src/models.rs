//! Core data model: site status, persisted site records and search results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// Reachability status of a logical site.
///
/// Stored as its SCREAMING_SNAKE_CASE name (`WORKING`, `NOT_FOUND`, ...).
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum SiteStatus {
    /// Never resolved.
    #[default]
    Unknown,
    /// A candidate URL answered with 2xx.
    Working,
    /// Search produced no candidate matching the site's domain pattern.
    NotFound,
    /// Every search call failed.
    Error,
    /// Candidates existed but none was reachable.
    Down,
}

impl SiteStatus {
    /// Parses a stored status, mapping anything unrecognised to `Unknown`.
    pub fn from_stored(value: &str) -> Self {
        value.parse().unwrap_or(SiteStatus::Unknown)
    }

    pub fn is_working(self) -> bool {
        self == SiteStatus::Working
    }
}

/// The persisted, mutable view of one logical site.
///
/// A record produced by the resolver is *detached*: it has no `id` and the
/// operator-owned fields hold defaults until it is merged with the stored one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteRecord {
    pub id: Option<i64>,
    pub name: String,
    pub current_working_url: Option<String>,
    pub status: SiteStatus,
    pub last_checked: Option<DateTime<Utc>>,
    pub last_updated: Option<DateTime<Utc>>,
    /// Latency of the winning probe in milliseconds.
    pub response_time_ms: Option<i64>,
    pub is_active: bool,
    pub notes: Option<String>,
    /// `notes` were written by an operator and survive later resolutions.
    /// Otherwise they hold the last resolver diagnostic.
    #[serde(default)]
    pub notes_pinned: bool,
}

impl SiteRecord {
    /// A fresh detached record for `name` with status `UNKNOWN`.
    pub fn detached(name: &str) -> Self {
        SiteRecord {
            id: None,
            name: name.to_lowercase(),
            current_working_url: None,
            status: SiteStatus::Unknown,
            last_checked: None,
            last_updated: None,
            response_time_ms: None,
            is_active: true,
            notes: None,
            notes_pinned: false,
        }
    }
}

/// One item extracted from a search results page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
}

impl SearchResult {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        SearchResult {
            title: title.into(),
            url: url.into(),
        }
    }
}
