//! Sweeps over the monitored sites.
//!
//! A sweep resolves sites one at a time, persists the merged records and
//! emits transition events in processing order. Full sweeps and stale checks
//! share one lock, so at most one of them runs at any time.

mod scheduler;
mod transition;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use log::{debug, error, info};
use tokio::sync::{Mutex, OwnedMutexGuard};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::error_handling::{DatabaseError, ErrorType, ProcessingStats, SweepError};
use crate::models::{SiteRecord, SiteStatus};
use crate::notifier::{MonitorEvent, Notifier, SweepSummary};
use crate::resolver::SiteResolver;
use crate::storage::SiteRepository;

pub use scheduler::spawn_scheduler;
pub use transition::{detect_transition, is_consistent, merge_resolution};

/// Timing and site list of the monitor.
#[derive(Debug, Clone)]
pub struct MonitorSettings {
    pub sites: Vec<String>,
    pub full_sweep_interval: Duration,
    pub stale_check_interval: Duration,
    pub per_site_delay: Duration,
}

impl From<&Config> for MonitorSettings {
    fn from(config: &Config) -> Self {
        MonitorSettings {
            sites: config.sites.clone(),
            full_sweep_interval: config.full_sweep_interval,
            stale_check_interval: config.stale_check_interval,
            per_site_delay: config.per_site_delay,
        }
    }
}

/// Outcome of refreshing one site.
#[derive(Debug, Clone)]
pub struct SiteRefresh {
    pub record: SiteRecord,
    pub event: Option<MonitorEvent>,
}

/// Runs sweeps and single-site refreshes against the repository.
pub struct Monitor {
    resolver: Arc<SiteResolver>,
    repository: Arc<dyn SiteRepository>,
    notifier: Arc<dyn Notifier>,
    settings: MonitorSettings,
    stats: Arc<ProcessingStats>,
    sweep_lock: Arc<Mutex<()>>,
    cancel: CancellationToken,
    sweeps_completed: AtomicUsize,
}

impl Monitor {
    pub fn new(
        resolver: Arc<SiteResolver>,
        repository: Arc<dyn SiteRepository>,
        notifier: Arc<dyn Notifier>,
        settings: MonitorSettings,
        stats: Arc<ProcessingStats>,
        cancel: CancellationToken,
    ) -> Self {
        Monitor {
            resolver,
            repository,
            notifier,
            settings,
            stats,
            sweep_lock: Arc::new(Mutex::new(())),
            cancel,
            sweeps_completed: AtomicUsize::new(0),
        }
    }

    pub fn settings(&self) -> &MonitorSettings {
        &self.settings
    }

    pub fn is_sweep_running(&self) -> bool {
        self.sweep_lock.try_lock().is_err()
    }

    /// Full sweeps that ran to the end or stopped on shutdown.
    pub fn sweeps_completed(&self) -> usize {
        self.sweeps_completed.load(Ordering::SeqCst)
    }

    /// Waits until no sweep holds the lock.
    pub async fn wait_idle(&self) {
        let _guard = self.sweep_lock.lock().await;
    }

    /// Resolves `name`, persists the merged record and emits its transition.
    ///
    /// # Arguments
    ///
    /// * `name` - Site to resolve
    /// * `previous` - The stored record the result is merged into, `None` for
    ///   a site seen for the first time
    ///
    /// # Behavior
    ///
    /// Merging keeps `id`, `is_active` and pinned notes from `previous` and
    /// keeps the last known URL unless the site is `WORKING` again. A first
    /// resolution emits no event. Does not take the sweep lock.
    ///
    /// # Errors
    ///
    /// Returns a `DatabaseError` if the merged record cannot be stored; no
    /// event is emitted in that case.
    pub async fn refresh_site(
        &self,
        name: &str,
        previous: Option<SiteRecord>,
    ) -> Result<SiteRefresh, DatabaseError> {
        let resolved = self.resolver.resolve(name).await;
        let now = Utc::now();
        let merged = merge_resolution(previous.as_ref(), resolved, now);

        let record = self
            .repository
            .upsert(&merged)
            .await
            .inspect_err(|e| error!("Failed to persist {}: {}", name, e))?;

        let event = detect_transition(previous.as_ref(), &record, now);
        if let Some(event) = &event {
            info!(
                "{}: {} ({} -> {})",
                record.name,
                event.action(),
                previous.as_ref().map(|p| p.status).unwrap_or_default(),
                record.status
            );
            self.notifier.emit(event.clone());
        }

        Ok(SiteRefresh { record, event })
    }

    /// Starts a full sweep in the background.
    ///
    /// Fails with `Busy` without waiting when another sweep holds the lock.
    pub fn start_full_sweep(
        self: &Arc<Self>,
    ) -> Result<JoinHandle<Result<SweepSummary, SweepError>>, SweepError> {
        let guard = self.try_acquire()?;
        let monitor = Arc::clone(self);
        Ok(tokio::spawn(async move { monitor.full_sweep(guard).await }))
    }

    /// Runs a full sweep on the calling task. Fails with `Busy` when another sweep runs.
    pub async fn run_full_sweep(&self) -> Result<SweepSummary, SweepError> {
        let guard = self.try_acquire()?;
        self.full_sweep(guard).await
    }

    /// Re-resolves every active record not checked within the full sweep interval.
    ///
    /// Emits transition events but no summary. Returns the number of sites checked.
    pub async fn run_stale_check(&self) -> Result<usize, SweepError> {
        let _guard = self.try_acquire()?;
        if self.cancel.is_cancelled() {
            return Err(SweepError::Cancelled);
        }

        let cutoff = before(Utc::now(), self.settings.full_sweep_interval);
        let stale = self
            .repository
            .list_stale(cutoff)
            .await
            .inspect_err(|e| self.abort_on_repository_error("stale check", e))?;

        let stale: Vec<SiteRecord> = stale.into_iter().filter(|r| r.is_active).collect();
        if stale.is_empty() {
            debug!("Stale check: nothing to do");
            return Ok(0);
        }
        info!("Stale check: {} sites not checked since {}", stale.len(), cutoff);

        let mut checked = 0;
        for record in stale {
            if checked > 0 && !self.pause_between_sites().await {
                return Err(SweepError::Cancelled);
            }
            if self.cancel.is_cancelled() {
                return Err(SweepError::Cancelled);
            }
            let name = record.name.clone();
            self.refresh_site(&name, Some(record))
                .await
                .inspect_err(|e| self.abort_on_repository_error("stale check", e))?;
            checked += 1;
        }
        Ok(checked)
    }

    fn try_acquire(&self) -> Result<OwnedMutexGuard<()>, SweepError> {
        Arc::clone(&self.sweep_lock)
            .try_lock_owned()
            .map_err(|_| SweepError::Busy)
    }

    async fn full_sweep(&self, _guard: OwnedMutexGuard<()>) -> Result<SweepSummary, SweepError> {
        if self.cancel.is_cancelled() {
            return Err(SweepError::Cancelled);
        }
        let started = Utc::now();
        info!("Full sweep started over {} sites", self.settings.sites.len());

        let mut summary = SweepSummary::default();
        for name in &self.settings.sites {
            if self.cancel.is_cancelled() {
                summary.cancelled = true;
                break;
            }

            let previous = self
                .repository
                .get_by_name(name)
                .await
                .inspect_err(|e| self.abort_on_repository_error("full sweep", e))?;
            if previous.as_ref().is_some_and(|p| !p.is_active) {
                debug!("{}: inactive, skipped", name);
                summary.skipped += 1;
                continue;
            }

            if summary.checked > 0 && !self.pause_between_sites().await {
                summary.cancelled = true;
                break;
            }

            let refresh = self
                .refresh_site(name, previous)
                .await
                .inspect_err(|e| self.abort_on_repository_error("full sweep", e))?;
            summary.checked += 1;
            if refresh.record.status == SiteStatus::Working {
                summary.working += 1;
            } else {
                summary.down += 1;
            }
            if refresh.event.is_some() {
                summary.transitions += 1;
            }
        }

        self.sweeps_completed.fetch_add(1, Ordering::SeqCst);
        info!(
            "Full sweep finished in {}s: {} checked, {} working, {} down, {} transitions{}",
            (Utc::now() - started).num_seconds(),
            summary.checked,
            summary.working,
            summary.down,
            summary.transitions,
            if summary.cancelled { " (cancelled)" } else { "" }
        );
        self.notifier.emit(MonitorEvent::SweepSummary(summary.clone()));
        Ok(summary)
    }

    /// Sleeps `per_site_delay`. Returns false when shutdown interrupted the wait.
    async fn pause_between_sites(&self) -> bool {
        if self.settings.per_site_delay.is_zero() {
            return !self.cancel.is_cancelled();
        }
        tokio::select! {
            _ = tokio::time::sleep(self.settings.per_site_delay) => true,
            _ = self.cancel.cancelled() => false,
        }
    }

    fn abort_on_repository_error(&self, what: &str, e: &DatabaseError) {
        error!("Aborting {}: repository unavailable: {}", what, e);
        self.stats.increment_error(ErrorType::RepositoryError);
    }

    /// Records overdue for a check: active and not checked within the full
    /// sweep interval plus `grace`.
    pub fn overdue(&self, records: &[SiteRecord], now: DateTime<Utc>, grace: Duration) -> usize {
        let limit = before(now, self.settings.full_sweep_interval + grace);
        records
            .iter()
            .filter(|r| r.is_active)
            .filter(|r| r.last_checked.map(|t| t < limit).unwrap_or(true))
            .count()
    }
}

/// `now - d`, saturating at the earliest representable instant.
fn before(now: DateTime<Utc>, d: Duration) -> DateTime<Utc> {
    chrono::Duration::from_std(d)
        .ok()
        .and_then(|d| now.checked_sub_signed(d))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}
