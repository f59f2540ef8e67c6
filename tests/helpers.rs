// Shared test helpers: an in-memory repository and fakes for search, probing
// and notification.
//
// Each test file includes this module with `#[path = "helpers.rs"] mod helpers;`.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio_util::sync::CancellationToken;

use mirror_status::browser::{SearchBackend, SearchProvider};
use mirror_status::catalog::SiteCatalog;
use mirror_status::error_handling::{BrowserError, DatabaseError, ProcessingStats};
use mirror_status::monitor::{Monitor, MonitorSettings};
use mirror_status::notifier::{MonitorEvent, Notifier};
use mirror_status::probe::{ProbeOutcome, Prober};
use mirror_status::resolver::{ResolverSettings, SiteResolver};
use mirror_status::storage::{init_memory_pool, SiteRepository, SqliteSiteRepository};
use mirror_status::{run_migrations, Config, CoreApi, SearchResult, SiteRecord, SiteStatus};

/// Creates an in-memory repository with migrations applied.
pub async fn create_test_repository() -> Arc<SqliteSiteRepository> {
    let pool = init_memory_pool()
        .await
        .expect("Failed to create test database pool");
    run_migrations(&pool)
        .await
        .expect("Failed to run migrations");
    Arc::new(SqliteSiteRepository::new(pool))
}

/// Repository kept in a plain map.
///
/// Unlike the SQLite pool it never waits on another thread, so tests on a
/// paused clock advance time only when every task is idle.
#[derive(Default)]
pub struct MemoryRepository {
    records: Mutex<BTreeMap<i64, SiteRecord>>,
}

impl MemoryRepository {
    fn snapshot(&self) -> Vec<SiteRecord> {
        self.records.lock().unwrap().values().cloned().collect()
    }
}

#[async_trait]
impl SiteRepository for MemoryRepository {
    async fn get_by_name(&self, name: &str) -> Result<Option<SiteRecord>, DatabaseError> {
        let name = name.trim().to_lowercase();
        Ok(self.snapshot().into_iter().find(|r| r.name == name))
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<SiteRecord>, DatabaseError> {
        Ok(self.records.lock().unwrap().get(&id).cloned())
    }

    async fn upsert(&self, record: &SiteRecord) -> Result<SiteRecord, DatabaseError> {
        let mut records = self.records.lock().unwrap();
        let name = record.name.trim().to_lowercase();
        let id = records
            .values()
            .find(|r| r.name == name)
            .and_then(|r| r.id)
            .unwrap_or_else(|| records.keys().next_back().map_or(1, |last| last + 1));
        let stored = SiteRecord {
            id: Some(id),
            name,
            ..record.clone()
        };
        records.insert(id, stored.clone());
        Ok(stored)
    }

    async fn list_all(&self) -> Result<Vec<SiteRecord>, DatabaseError> {
        Ok(self.snapshot())
    }

    async fn list_stale(&self, older_than: DateTime<Utc>) -> Result<Vec<SiteRecord>, DatabaseError> {
        Ok(self
            .snapshot()
            .into_iter()
            .filter(|r| r.last_checked.map_or(true, |t| t < older_than))
            .collect())
    }

    async fn count_by_status(&self) -> Result<BTreeMap<SiteStatus, u64>, DatabaseError> {
        let mut counts = BTreeMap::new();
        for record in self.snapshot() {
            *counts.entry(record.status).or_insert(0) += 1;
        }
        Ok(counts)
    }

    async fn list_recently_updated(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<SiteRecord>, DatabaseError> {
        let mut recent: Vec<SiteRecord> = self
            .snapshot()
            .into_iter()
            .filter(|r| r.last_updated.is_some_and(|t| t >= since))
            .collect();
        recent.sort_by(|a, b| b.last_updated.cmp(&a.last_updated));
        Ok(recent)
    }

    async fn delete(&self, id: i64) -> Result<bool, DatabaseError> {
        Ok(self.records.lock().unwrap().remove(&id).is_some())
    }
}

/// Search backend answering every query that equals a site name with that
/// site's URLs, on both providers.
#[derive(Default)]
pub struct FakeSearch {
    answers: Mutex<HashMap<String, Vec<String>>>,
    failing: AtomicBool,
}

impl FakeSearch {
    pub fn answer(&self, query: &str, urls: &[&str]) {
        self.answers.lock().unwrap().insert(
            query.to_string(),
            urls.iter().map(|u| u.to_string()).collect(),
        );
    }

    /// Makes every call fail until reset.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl SearchBackend for FakeSearch {
    async fn run_search(
        &self,
        _provider: SearchProvider,
        query: &str,
    ) -> Result<Vec<SearchResult>, BrowserError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(BrowserError::Unavailable("HTTP 502".to_string()));
        }
        Ok(self
            .answers
            .lock()
            .unwrap()
            .get(query)
            .map(|urls| urls.iter().map(|u| SearchResult::new("", u.as_str())).collect())
            .unwrap_or_default())
    }
}

/// Prober treating listed URLs as reachable; everything else times out.
#[derive(Default)]
pub struct FakeProber {
    reachable: Mutex<HashMap<String, i64>>,
}

impl FakeProber {
    pub fn up(&self, url: &str, latency_ms: i64) {
        self.reachable
            .lock()
            .unwrap()
            .insert(url.to_string(), latency_ms);
    }

    pub fn down(&self, url: &str) {
        self.reachable.lock().unwrap().remove(url);
    }
}

#[async_trait]
impl Prober for FakeProber {
    async fn probe(&self, url: &str) -> ProbeOutcome {
        match self.reachable.lock().unwrap().get(url) {
            Some(latency) => ProbeOutcome::reachable(*latency),
            None => ProbeOutcome::unreachable(5000, 0),
        }
    }
}

/// Notifier keeping every event in memory.
#[derive(Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<MonitorEvent>>,
}

impl RecordingNotifier {
    pub fn events(&self) -> Vec<MonitorEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Status and domain change events only.
    pub fn transitions(&self) -> Vec<MonitorEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.transition().is_some())
            .collect()
    }

    pub fn summaries(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, MonitorEvent::SweepSummary(_)))
            .count()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }
}

impl Notifier for RecordingNotifier {
    fn emit(&self, event: MonitorEvent) {
        self.events.lock().unwrap().push(event);
    }
}

/// Fully wired core on top of the fakes.
pub struct Harness {
    pub search: Arc<FakeSearch>,
    pub prober: Arc<FakeProber>,
    pub notifier: Arc<RecordingNotifier>,
    pub repository: Arc<SqliteSiteRepository>,
    pub monitor: Arc<Monitor>,
    pub api: Arc<CoreApi>,
    pub cancel: CancellationToken,
}

impl Harness {
    pub async fn new(sites: &[&str]) -> Self {
        Self::with_delay(sites, Duration::ZERO).await
    }

    /// `per_site_delay` keeps a sweep running long enough to race against it.
    pub async fn with_delay(sites: &[&str], per_site_delay: Duration) -> Self {
        let config = Config {
            sites: sites.iter().map(|s| s.to_string()).collect(),
            per_site_delay,
            inter_alias_delay: Duration::ZERO,
            ..Default::default()
        };

        let search = Arc::new(FakeSearch::default());
        let prober = Arc::new(FakeProber::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let repository = create_test_repository().await;
        let stats = Arc::new(ProcessingStats::new());
        let cancel = CancellationToken::new();

        let resolver = Arc::new(SiteResolver::new(
            search.clone(),
            prober.clone(),
            SiteCatalog::builtin(),
            ResolverSettings::from(&config),
            Arc::clone(&stats),
        ));
        let monitor = Arc::new(Monitor::new(
            Arc::clone(&resolver),
            repository.clone(),
            notifier.clone(),
            MonitorSettings::from(&config),
            stats,
            cancel.clone(),
        ));
        let api = Arc::new(CoreApi::new(
            resolver,
            repository.clone(),
            Arc::clone(&monitor),
            notifier.clone(),
            &config,
        ));

        Harness {
            search,
            prober,
            notifier,
            repository,
            monitor,
            api,
            cancel,
        }
    }

    /// Stores a record as if an earlier sweep had produced it.
    pub async fn seed(&self, name: &str, status: SiteStatus, url: Option<&str>) -> SiteRecord {
        let checked = Utc::now() - chrono::Duration::minutes(10);
        self.seed_checked_at(name, status, url, checked).await
    }

    pub async fn seed_checked_at(
        &self,
        name: &str,
        status: SiteStatus,
        url: Option<&str>,
        checked: DateTime<Utc>,
    ) -> SiteRecord {
        let record = SiteRecord {
            current_working_url: url.map(str::to_string),
            status,
            last_checked: Some(checked),
            last_updated: Some(checked),
            response_time_ms: url.map(|_| 300),
            ..SiteRecord::detached(name)
        };
        self.repository
            .upsert(&record)
            .await
            .expect("Failed to seed record")
    }

    pub async fn all(&self) -> Vec<SiteRecord> {
        self.repository.list_all().await.expect("repository read")
    }

    pub async fn stored(&self, name: &str) -> SiteRecord {
        self.repository
            .get_by_name(name)
            .await
            .expect("repository read")
            .unwrap_or_else(|| panic!("{name} not stored"))
    }
}

/// Monitor over the fakes and a `MemoryRepository`, for tests on a paused clock.
pub struct ScheduledMonitor {
    pub search: Arc<FakeSearch>,
    pub prober: Arc<FakeProber>,
    pub notifier: Arc<RecordingNotifier>,
    pub repository: Arc<MemoryRepository>,
    pub monitor: Arc<Monitor>,
    pub cancel: CancellationToken,
}

impl ScheduledMonitor {
    pub fn new(config: &Config) -> Self {
        let search = Arc::new(FakeSearch::default());
        let prober = Arc::new(FakeProber::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let repository = Arc::new(MemoryRepository::default());
        let stats = Arc::new(ProcessingStats::new());
        let cancel = CancellationToken::new();

        let resolver = Arc::new(SiteResolver::new(
            search.clone(),
            prober.clone(),
            SiteCatalog::builtin(),
            ResolverSettings::from(config),
            Arc::clone(&stats),
        ));
        let monitor = Arc::new(Monitor::new(
            resolver,
            repository.clone(),
            notifier.clone(),
            MonitorSettings::from(config),
            stats,
            cancel.clone(),
        ));

        ScheduledMonitor {
            search,
            prober,
            notifier,
            repository,
            monitor,
            cancel,
        }
    }
}
