//! The façade consumed by the HTTP surface.

mod health;
mod view;

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use log::info;

use crate::catalog::ProfileSummary;
use crate::config::{Config, MAX_SITE_NAME_LEN, RECENTLY_UPDATED_WINDOW};
use crate::error_handling::ApiError;
use crate::models::SiteRecord;
use crate::monitor::{is_consistent, Monitor};
use crate::notifier::{MonitorEvent, Notifier};
use crate::resolver::SiteResolver;
use crate::storage::SiteRepository;

pub use health::{HealthReport, HealthStatus};
pub use view::{RefreshAck, SiteDetail, SiteUpdate, SiteView, Statistics};

/// Normalizes a site name: trimmed, lowercase, 1 to 64 chars of `[a-z0-9-]`.
pub fn validate_site_name(name: &str) -> Result<String, ApiError> {
    let name = name.trim().to_lowercase();
    if name.is_empty() {
        return Err(ApiError::Invalid("site name must not be empty".to_string()));
    }
    if name.len() > MAX_SITE_NAME_LEN {
        return Err(ApiError::Invalid(format!(
            "site name longer than {MAX_SITE_NAME_LEN} characters"
        )));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
    {
        return Err(ApiError::Invalid(format!(
            "site name {name:?} may only contain a-z, 0-9 and '-'"
        )));
    }
    Ok(name)
}

fn validate_url(url: &str) -> Result<String, ApiError> {
    let parsed = url::Url::parse(url.trim())
        .map_err(|e| ApiError::Invalid(format!("invalid URL {url:?}: {e}")))?;
    if !matches!(parsed.scheme(), "http" | "https") || parsed.host_str().is_none() {
        return Err(ApiError::Invalid(format!(
            "URL must be an absolute http(s) URL: {url}"
        )));
    }
    Ok(parsed.to_string())
}

/// Entry points for ad-hoc resolution, refreshes and administration.
pub struct CoreApi {
    resolver: Arc<SiteResolver>,
    repository: Arc<dyn SiteRepository>,
    monitor: Arc<Monitor>,
    notifier: Arc<dyn Notifier>,
    per_site_delay: Duration,
    alert_threshold: Duration,
}

impl CoreApi {
    pub fn new(
        resolver: Arc<SiteResolver>,
        repository: Arc<dyn SiteRepository>,
        monitor: Arc<Monitor>,
        notifier: Arc<dyn Notifier>,
        config: &Config,
    ) -> Self {
        CoreApi {
            resolver,
            repository,
            monitor,
            notifier,
            per_site_delay: config.per_site_delay,
            alert_threshold: config.alert_threshold,
        }
    }

    async fn load(&self, id: i64) -> Result<SiteRecord, ApiError> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("site {id}")))
    }

    /// Resolves `name` without touching the repository.
    pub async fn resolve(&self, name: &str) -> Result<SiteRecord, ApiError> {
        let name = validate_site_name(name)?;
        Ok(self.resolver.resolve(&name).await)
    }

    /// Resolves each name in order, pausing between them.
    ///
    /// Every name is validated before the first search runs.
    pub async fn resolve_batch(&self, names: &[String]) -> Result<Vec<SiteRecord>, ApiError> {
        let names = names
            .iter()
            .map(|n| validate_site_name(n))
            .collect::<Result<Vec<_>, _>>()?;

        let mut records = Vec::with_capacity(names.len());
        for (i, name) in names.iter().enumerate() {
            if i > 0 && !self.per_site_delay.is_zero() {
                tokio::time::sleep(self.per_site_delay).await;
            }
            records.push(self.resolver.resolve(name).await);
        }
        Ok(records)
    }

    /// Re-resolves the stored site `id` and persists the result under the same id.
    pub async fn refresh_one(&self, id: i64) -> Result<SiteRecord, ApiError> {
        let previous = self.load(id).await?;
        let name = previous.name.clone();
        let refresh = self.monitor.refresh_site(&name, Some(previous)).await?;
        Ok(refresh.record)
    }

    /// Starts a full sweep in the background; `Busy` while one is running.
    pub fn refresh_all(&self) -> Result<RefreshAck, ApiError> {
        self.monitor.start_full_sweep()?;
        let sites = self.monitor.settings().sites.len();
        info!("Manual full sweep accepted for {} sites", sites);
        Ok(RefreshAck {
            accepted: true,
            sites,
        })
    }

    /// Resolves and stores a site that is not yet known.
    ///
    /// The stored record may have any status; a site that cannot be found yet
    /// is still added and picked up by later sweeps if it is in the site list.
    ///
    /// # Errors
    ///
    /// * `ApiError::Invalid` - `name` is not a valid site name
    /// * `ApiError::AlreadyExists` - a record with that name is stored
    pub async fn add_new(&self, name: &str) -> Result<SiteRecord, ApiError> {
        let name = validate_site_name(name)?;
        if self.repository.get_by_name(&name).await?.is_some() {
            return Err(ApiError::AlreadyExists(name));
        }
        let refresh = self.monitor.refresh_site(&name, None).await?;
        info!("Added site {} ({})", refresh.record.name, refresh.record.status);
        Ok(refresh.record)
    }

    pub async fn health(&self) -> Result<HealthReport, ApiError> {
        let records = self.repository.list_all().await?;
        let overdue = self
            .monitor
            .overdue(&records, Utc::now(), self.alert_threshold);
        Ok(HealthReport::from_records(
            &records,
            overdue,
            self.monitor.is_sweep_running(),
        ))
    }

    pub async fn list_sites(&self) -> Result<Vec<SiteView>, ApiError> {
        let records = self.repository.list_all().await?;
        Ok(records.iter().map(SiteView::from).collect())
    }

    pub async fn get_site(&self, id: i64) -> Result<SiteDetail, ApiError> {
        Ok(SiteDetail::from(&self.load(id).await?))
    }

    /// Applies an operator edit.
    ///
    /// # Arguments
    ///
    /// * `id` - Id of the stored site
    /// * `update` - Fields to change; `None` leaves a field as it is
    ///
    /// # Behavior
    ///
    /// Non-empty notes are pinned and survive later resolutions; empty notes
    /// clear them and hand `notes` back to resolver diagnostics.
    /// `last_updated` moves only if the URL changes.
    ///
    /// # Errors
    ///
    /// * `ApiError::NotFound` - no site has `id`
    /// * `ApiError::Invalid` - the URL is not absolute http(s), or the result
    ///   would be `WORKING` without a URL
    /// * `ApiError::Internal` - the store failed
    pub async fn update_site(&self, id: i64, update: SiteUpdate) -> Result<SiteDetail, ApiError> {
        let previous = self.load(id).await?;
        let mut record = previous.clone();

        if let Some(url) = update.current_working_url.as_deref() {
            record.current_working_url = Some(validate_url(url)?);
        }
        if let Some(status) = update.status {
            record.status = status;
        }
        if let Some(is_active) = update.is_active {
            record.is_active = is_active;
        }
        if let Some(notes) = update.notes {
            record.notes = Some(notes).filter(|n| !n.trim().is_empty());
            record.notes_pinned = record.notes.is_some();
        }
        if !is_consistent(&record) {
            return Err(ApiError::Invalid(
                "status WORKING requires a current working URL".to_string(),
            ));
        }
        if record.current_working_url != previous.current_working_url {
            record.last_updated = Some(Utc::now());
        }

        let stored = self.repository.upsert(&record).await?;
        info!("Site {} updated by operator", stored.name);
        Ok(SiteDetail::from(&stored))
    }

    pub async fn delete_site(&self, id: i64) -> Result<(), ApiError> {
        if self.repository.delete(id).await? {
            info!("Site {} deleted", id);
            Ok(())
        } else {
            Err(ApiError::NotFound(format!("site {id}")))
        }
    }

    pub async fn statistics(&self) -> Result<Statistics, ApiError> {
        let status_distribution = self.repository.count_by_status().await?;
        let since = Utc::now()
            - chrono::Duration::from_std(RECENTLY_UPDATED_WINDOW)
                .map_err(|e| ApiError::Internal(e.to_string()))?;
        let recently_updated = self.repository.list_recently_updated(since).await?;

        Ok(Statistics {
            total_sites: status_distribution.values().sum(),
            status_distribution,
            recently_updated: recently_updated.iter().map(SiteView::from).collect(),
        })
    }

    pub fn supported_sites(&self) -> Vec<ProfileSummary> {
        self.resolver
            .catalog()
            .profiles()
            .iter()
            .map(|p| p.summary())
            .collect()
    }

    pub fn send_test_notification(&self) {
        self.notifier.emit(MonitorEvent::Test {
            message: "Test notification from mirror_status".to_string(),
        });
    }
}
