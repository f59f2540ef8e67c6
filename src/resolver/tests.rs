use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use super::*;
use crate::probe::ProbeOutcome;

/// Search backend answering from a fixed table; unknown queries return no results.
#[derive(Default)]
struct ScriptedSearch {
    responses: HashMap<(SearchProvider, String), Result<Vec<SearchResult>, BrowserError>>,
    fail_everything: Option<BrowserError>,
    calls: Mutex<Vec<(SearchProvider, String)>>,
}

impl ScriptedSearch {
    fn answer(mut self, provider: SearchProvider, query: &str, urls: &[&str]) -> Self {
        let results = urls.iter().map(|u| SearchResult::new("", *u)).collect();
        self.responses
            .insert((provider, query.to_string()), Ok(results));
        self
    }

    fn fail(mut self, provider: SearchProvider, query: &str, error: BrowserError) -> Self {
        self.responses.insert((provider, query.to_string()), Err(error));
        self
    }

    fn calls(&self) -> Vec<(SearchProvider, String)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchBackend for ScriptedSearch {
    async fn run_search(
        &self,
        provider: SearchProvider,
        query: &str,
    ) -> Result<Vec<SearchResult>, BrowserError> {
        self.calls
            .lock()
            .unwrap()
            .push((provider, query.to_string()));
        if let Some(e) = &self.fail_everything {
            return Err(e.clone());
        }
        self.responses
            .get(&(provider, query.to_string()))
            .cloned()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

/// Prober that treats listed URLs as reachable with the given latency.
#[derive(Default)]
struct TableProber {
    reachable: HashMap<String, i64>,
    probed: Mutex<Vec<String>>,
}

impl TableProber {
    fn up(mut self, url: &str, latency_ms: i64) -> Self {
        self.reachable.insert(url.to_string(), latency_ms);
        self
    }
}

#[async_trait]
impl Prober for TableProber {
    async fn probe(&self, url: &str) -> ProbeOutcome {
        self.probed.lock().unwrap().push(url.to_string());
        match self.reachable.get(url) {
            Some(latency) => ProbeOutcome::reachable(*latency),
            None => ProbeOutcome::unreachable(5, 0),
        }
    }
}

fn resolver(search: Arc<ScriptedSearch>, prober: Arc<TableProber>) -> SiteResolver {
    SiteResolver::new(
        search,
        prober,
        SiteCatalog::builtin(),
        ResolverSettings {
            max_aliases_per_provider: 3,
            inter_alias_delay: Duration::ZERO,
        },
        Arc::new(ProcessingStats::new()),
    )
}

#[tokio::test]
async fn test_first_reachable_candidate_wins() {
    let search = Arc::new(ScriptedSearch::default().answer(
        SearchProvider::Primary,
        "movierulz",
        &["https://movierulz.ms/", "https://movierulz.tv/"],
    ));
    let prober = Arc::new(TableProber::default().up("https://movierulz.tv/", 420));

    let record = resolver(search, Arc::clone(&prober)).resolve("movierulz").await;

    assert_eq!(record.status, SiteStatus::Working);
    assert_eq!(record.current_working_url.as_deref(), Some("https://movierulz.tv/"));
    assert_eq!(record.response_time_ms, Some(420));
    assert!(record.last_checked.is_some());
    assert!(record.id.is_none());
    assert_eq!(
        *prober.probed.lock().unwrap(),
        vec!["https://movierulz.ms/", "https://movierulz.tv/"]
    );
}

#[tokio::test]
async fn test_primary_provider_takes_precedence() {
    let search = Arc::new(
        ScriptedSearch::default()
            .answer(SearchProvider::Secondary, "moviezap", &["https://moviezap.org/"])
            .answer(SearchProvider::Primary, "movie zap", &["https://moviezap.in/"]),
    );
    let prober = Arc::new(
        TableProber::default()
            .up("https://moviezap.org/", 10)
            .up("https://moviezap.in/", 900),
    );

    let record = resolver(search, prober).resolve("moviezap").await;
    assert_eq!(record.current_working_url.as_deref(), Some("https://moviezap.in/"));
}

#[tokio::test]
async fn test_aliases_are_capped_per_provider() {
    let search = Arc::new(ScriptedSearch::default());
    let prober = Arc::new(TableProber::default());

    resolver(Arc::clone(&search), prober).resolve("movierulz").await;

    let calls = search.calls();
    assert_eq!(calls.len(), 6);
    assert_eq!(calls[0], (SearchProvider::Primary, "movierulz".to_string()));
    assert_eq!(calls[2], (SearchProvider::Primary, "movierulz.com".to_string()));
    assert_eq!(calls[3], (SearchProvider::Secondary, "movierulz".to_string()));
}

#[tokio::test]
async fn test_no_matching_results_is_not_found() {
    let search = Arc::new(ScriptedSearch::default().answer(
        SearchProvider::Primary,
        "movierulz",
        &["https://www.youtube.com/watch?v=1", "https://unrelated.org/"],
    ));
    let prober = Arc::new(TableProber::default());

    let record = resolver(search, Arc::clone(&prober)).resolve("movierulz").await;

    assert_eq!(record.status, SiteStatus::NotFound);
    assert!(record.current_working_url.is_none());
    assert!(prober.probed.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_unreachable_candidates_are_down() {
    let search = Arc::new(ScriptedSearch::default().answer(
        SearchProvider::Secondary,
        "moviezap",
        &["https://moviezap.in/", "https://moviezap.org/"],
    ));
    let prober = Arc::new(TableProber::default());

    let record = resolver(search, prober).resolve("moviezap").await;

    assert_eq!(record.status, SiteStatus::Down);
    assert!(record.current_working_url.is_none());
    assert!(record.notes.unwrap().contains("2 candidate"));
}

#[tokio::test]
async fn test_partial_search_failure_is_not_fatal() {
    let search = Arc::new(
        ScriptedSearch::default()
            .fail(SearchProvider::Primary, "moviezap", BrowserError::Timeout)
            .answer(SearchProvider::Secondary, "moviezap", &["https://moviezap.co/"]),
    );
    let prober = Arc::new(TableProber::default().up("https://moviezap.co/", 77));

    let record = resolver(search, prober).resolve("moviezap").await;
    assert_eq!(record.status, SiteStatus::Working);
}

#[tokio::test]
async fn test_all_searches_failing_is_error() {
    let search = Arc::new(ScriptedSearch {
        fail_everything: Some(BrowserError::Unavailable("HTTP 502".to_string())),
        ..Default::default()
    });
    let prober = Arc::new(TableProber::default());
    let stats = Arc::new(ProcessingStats::new());
    let resolver = SiteResolver::new(
        search,
        prober,
        SiteCatalog::builtin(),
        ResolverSettings {
            max_aliases_per_provider: 2,
            inter_alias_delay: Duration::ZERO,
        },
        Arc::clone(&stats),
    );

    let record = resolver.resolve("movierulz").await;

    assert_eq!(record.status, SiteStatus::Error);
    assert_eq!(
        record.notes.as_deref(),
        Some("Search failed: browser automation unavailable: HTTP 502")
    );
    assert_eq!(stats.get_error_count(ErrorType::BrowserUnavailable), 4);
}

#[tokio::test]
async fn test_unknown_name_uses_synthesized_profile() {
    let search = Arc::new(ScriptedSearch::default().answer(
        SearchProvider::Primary,
        "cinevood latest",
        &["https://cinevood.lol/"],
    ));
    let prober = Arc::new(TableProber::default().up("https://cinevood.lol/", 300));

    let record = resolver(Arc::clone(&search), prober).resolve("CineVood").await;

    assert_eq!(record.name, "cinevood");
    assert_eq!(record.status, SiteStatus::Working);
    assert_eq!(search.calls()[1].1, "cinevood.com");
}

#[tokio::test(start_paused = true)]
async fn test_searches_are_spaced_by_inter_alias_delay() {
    let search = Arc::new(ScriptedSearch::default());
    let prober = Arc::new(TableProber::default());
    let resolver = SiteResolver::new(
        search,
        prober,
        SiteCatalog::builtin(),
        ResolverSettings {
            max_aliases_per_provider: 2,
            inter_alias_delay: Duration::from_millis(1500),
        },
        Arc::new(ProcessingStats::new()),
    );

    let start = tokio::time::Instant::now();
    resolver.resolve("moviezap").await;
    // four calls, three gaps
    assert!(start.elapsed() >= Duration::from_millis(4500));
}
