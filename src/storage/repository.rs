//! The site repository port.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error_handling::DatabaseError;
use crate::models::{SiteRecord, SiteStatus};

/// Persistent store of site records keyed by case-insensitive name.
///
/// Implementations are shared across tasks and must be safe to call
/// concurrently; `upsert` of one record is atomic.
#[async_trait]
pub trait SiteRepository: Send + Sync {
    async fn get_by_name(&self, name: &str) -> Result<Option<SiteRecord>, DatabaseError>;

    async fn get_by_id(&self, id: i64) -> Result<Option<SiteRecord>, DatabaseError>;

    /// Inserts the record, or replaces the stored one with the same name.
    ///
    /// Returns the stored record with its id.
    async fn upsert(&self, record: &SiteRecord) -> Result<SiteRecord, DatabaseError>;

    /// All records ordered by id.
    async fn list_all(&self) -> Result<Vec<SiteRecord>, DatabaseError>;

    /// Records never checked or last checked before `older_than`.
    async fn list_stale(&self, older_than: DateTime<Utc>) -> Result<Vec<SiteRecord>, DatabaseError>;

    /// Record count per status; every status is present, absent ones with 0.
    async fn count_by_status(&self) -> Result<BTreeMap<SiteStatus, u64>, DatabaseError>;

    /// Records whose URL changed at or after `since`, newest first.
    async fn list_recently_updated(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<SiteRecord>, DatabaseError>;

    /// Removes the record. Returns whether a row existed.
    async fn delete(&self, id: i64) -> Result<bool, DatabaseError>;
}
