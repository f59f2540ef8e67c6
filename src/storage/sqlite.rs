//! SQLite implementation of the site repository.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, Row, Sqlite};
use strum::IntoEnumIterator;

use super::repository::SiteRepository;
use crate::error_handling::DatabaseError;
use crate::models::{SiteRecord, SiteStatus};

/// `SiteRepository` backed by the `sites` table.
#[derive(Clone)]
pub struct SqliteSiteRepository {
    pool: Arc<Pool<Sqlite>>,
}

impl SqliteSiteRepository {
    pub fn new(pool: Arc<Pool<Sqlite>>) -> Self {
        SqliteSiteRepository { pool }
    }
}

fn to_millis(ts: Option<DateTime<Utc>>) -> Option<i64> {
    ts.map(|t| t.timestamp_millis())
}

fn from_millis(ms: Option<i64>) -> Option<DateTime<Utc>> {
    ms.and_then(DateTime::from_timestamp_millis)
}

/// Reads an optional column; a column missing from an older schema reads as NULL.
fn optional<'r, T>(row: &'r SqliteRow, column: &str) -> Option<T>
where
    T: sqlx::Decode<'r, Sqlite> + sqlx::Type<Sqlite>,
{
    row.try_get::<Option<T>, _>(column).ok().flatten()
}

fn decode_site(row: &SqliteRow) -> Result<SiteRecord, DatabaseError> {
    let id: i64 = row.try_get("id")?;
    let name: String = row.try_get("name")?;
    let status = optional::<String>(row, "status")
        .map(|s| SiteStatus::from_stored(&s))
        .unwrap_or_default();

    Ok(SiteRecord {
        id: Some(id),
        name,
        current_working_url: optional(row, "current_working_url"),
        status,
        last_checked: from_millis(optional(row, "last_checked")),
        last_updated: from_millis(optional(row, "last_updated")),
        response_time_ms: optional(row, "response_time_ms"),
        is_active: optional::<bool>(row, "is_active").unwrap_or(true),
        notes: optional(row, "notes"),
        notes_pinned: optional::<bool>(row, "notes_pinned").unwrap_or(false),
    })
}

fn decode_all(rows: &[SqliteRow]) -> Result<Vec<SiteRecord>, DatabaseError> {
    rows.iter().map(decode_site).collect()
}

#[async_trait]
impl SiteRepository for SqliteSiteRepository {
    async fn get_by_name(&self, name: &str) -> Result<Option<SiteRecord>, DatabaseError> {
        let row = sqlx::query("SELECT * FROM sites WHERE name = ?")
            .bind(name.trim().to_lowercase())
            .fetch_optional(self.pool.as_ref())
            .await?;
        row.as_ref().map(decode_site).transpose()
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<SiteRecord>, DatabaseError> {
        let row = sqlx::query("SELECT * FROM sites WHERE id = ?")
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await?;
        row.as_ref().map(decode_site).transpose()
    }

    async fn upsert(&self, record: &SiteRecord) -> Result<SiteRecord, DatabaseError> {
        let row = sqlx::query(
            "INSERT INTO sites (
                id, name, current_working_url, status, is_active,
                last_checked, last_updated, response_time_ms, notes, notes_pinned
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(name) DO UPDATE SET
                current_working_url = excluded.current_working_url,
                status = excluded.status,
                is_active = excluded.is_active,
                last_checked = excluded.last_checked,
                last_updated = excluded.last_updated,
                response_time_ms = excluded.response_time_ms,
                notes = excluded.notes,
                notes_pinned = excluded.notes_pinned
            RETURNING *",
        )
        .bind(record.id)
        .bind(record.name.trim().to_lowercase())
        .bind(record.current_working_url.as_deref())
        .bind(record.status.as_ref())
        .bind(record.is_active)
        .bind(to_millis(record.last_checked))
        .bind(to_millis(record.last_updated))
        .bind(record.response_time_ms)
        .bind(record.notes.as_deref())
        .bind(record.notes_pinned)
        .fetch_one(self.pool.as_ref())
        .await?;
        decode_site(&row)
    }

    async fn list_all(&self) -> Result<Vec<SiteRecord>, DatabaseError> {
        let rows = sqlx::query("SELECT * FROM sites ORDER BY id")
            .fetch_all(self.pool.as_ref())
            .await?;
        decode_all(&rows)
    }

    async fn list_stale(&self, older_than: DateTime<Utc>) -> Result<Vec<SiteRecord>, DatabaseError> {
        let rows = sqlx::query(
            "SELECT * FROM sites WHERE last_checked IS NULL OR last_checked < ? ORDER BY id",
        )
        .bind(older_than.timestamp_millis())
        .fetch_all(self.pool.as_ref())
        .await?;
        decode_all(&rows)
    }

    async fn count_by_status(&self) -> Result<BTreeMap<SiteStatus, u64>, DatabaseError> {
        let mut counts: BTreeMap<SiteStatus, u64> = SiteStatus::iter().map(|s| (s, 0)).collect();
        let rows = sqlx::query("SELECT status, COUNT(*) AS n FROM sites GROUP BY status")
            .fetch_all(self.pool.as_ref())
            .await?;
        for row in rows {
            let status = optional::<String>(&row, "status")
                .map(|s| SiteStatus::from_stored(&s))
                .unwrap_or_default();
            let n: i64 = row.try_get("n")?;
            *counts.entry(status).or_insert(0) += u64::try_from(n).unwrap_or(0);
        }
        Ok(counts)
    }

    async fn list_recently_updated(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<SiteRecord>, DatabaseError> {
        let rows = sqlx::query(
            "SELECT * FROM sites WHERE last_updated >= ? ORDER BY last_updated DESC, id",
        )
        .bind(since.timestamp_millis())
        .fetch_all(self.pool.as_ref())
        .await?;
        decode_all(&rows)
    }

    async fn delete(&self, id: i64) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM sites WHERE id = ?")
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
