//! Site resolution.
//!
//! Searches every alias of a site on both providers, filters the results down
//! to candidate mirrors and returns the first one that answers.

#[cfg(test)]
mod tests;

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use log::{debug, info, warn};

use crate::browser::{SearchBackend, SearchProvider};
use crate::catalog::{SiteCatalog, SiteProfile};
use crate::config::Config;
use crate::error_handling::{BrowserError, ErrorType, ProcessingStats};
use crate::extract::extract;
use crate::models::{SearchResult, SiteRecord, SiteStatus};
use crate::probe::Prober;

/// Tunables of the resolver.
#[derive(Debug, Clone)]
pub struct ResolverSettings {
    pub max_aliases_per_provider: usize,
    pub inter_alias_delay: Duration,
}

impl From<&Config> for ResolverSettings {
    fn from(config: &Config) -> Self {
        ResolverSettings {
            max_aliases_per_provider: config.max_aliases_per_provider,
            inter_alias_delay: config.inter_alias_delay,
        }
    }
}

/// Resolves logical site names to their currently reachable URL.
///
/// Holds no per-site state; concurrent calls for different names are safe.
pub struct SiteResolver {
    search: Arc<dyn SearchBackend>,
    prober: Arc<dyn Prober>,
    catalog: SiteCatalog,
    settings: ResolverSettings,
    stats: Arc<ProcessingStats>,
}

impl SiteResolver {
    pub fn new(
        search: Arc<dyn SearchBackend>,
        prober: Arc<dyn Prober>,
        catalog: SiteCatalog,
        settings: ResolverSettings,
        stats: Arc<ProcessingStats>,
    ) -> Self {
        SiteResolver {
            search,
            prober,
            catalog,
            settings,
            stats,
        }
    }

    pub fn catalog(&self) -> &SiteCatalog {
        &self.catalog
    }

    /// Resolves `name` into a detached record.
    ///
    /// # Arguments
    ///
    /// * `name` - Logical site name; catalog sites use their profile, other
    ///   names get a synthesized one
    ///
    /// # Behavior
    ///
    /// Searches every alias on both providers, extracts candidate URLs that
    /// match the site's domain pattern and probes them in order. The first
    /// reachable candidate wins with status `WORKING`. Otherwise the status is
    /// `ERROR` (every search failed), `NOT_FOUND` (no candidate) or `DOWN`
    /// (no candidate answered), and `notes` describes why.
    ///
    /// Never fails and never touches the repository. The record has no `id`.
    pub async fn resolve(&self, name: &str) -> SiteRecord {
        let mut record = SiteRecord::detached(name.trim());

        let profile = match self.catalog.profile_for(&record.name) {
            Ok(profile) => profile,
            Err(e) => {
                warn!("Cannot build a profile for {}: {}", record.name, e);
                record.status = SiteStatus::Error;
                record.last_checked = Some(Utc::now());
                record.notes = Some(format!("Invalid site profile: {e}"));
                return record;
            }
        };

        let results = match self.search_all(&profile).await {
            Ok(results) => results,
            Err(last_error) => {
                warn!("Every search for {} failed: {}", profile.name, last_error);
                record.status = SiteStatus::Error;
                record.last_checked = Some(Utc::now());
                record.notes = Some(format!("Search failed: {last_error}"));
                return record;
            }
        };

        let candidates = extract(&results, &profile);
        debug!(
            "{}: {} search results, {} candidates",
            profile.name,
            results.len(),
            candidates.len()
        );

        if candidates.is_empty() {
            record.status = SiteStatus::NotFound;
            record.last_checked = Some(Utc::now());
            record.notes = Some(format!(
                "No search result matched {}",
                profile.domain_pattern.as_str()
            ));
            info!("{}: no candidate URL found", profile.name);
            return record;
        }

        for candidate in &candidates {
            let outcome = self.prober.probe(candidate).await;
            if outcome.reachable {
                info!(
                    "{}: {} is reachable ({}ms)",
                    profile.name, candidate, outcome.latency_ms
                );
                record.status = SiteStatus::Working;
                record.current_working_url = Some(candidate.clone());
                record.response_time_ms = Some(outcome.latency_ms);
                record.last_checked = Some(Utc::now());
                return record;
            }
            debug!(
                "{}: {} unreachable (status {})",
                profile.name, candidate, outcome.observed_status
            );
        }

        info!(
            "{}: none of {} candidates is reachable",
            profile.name,
            candidates.len()
        );
        record.status = SiteStatus::Down;
        record.last_checked = Some(Utc::now());
        record.notes = Some(format!(
            "{} candidate URLs found, none reachable",
            candidates.len()
        ));
        record
    }

    /// Runs every alias on every provider and merges the results in call order.
    ///
    /// Returns the last error only when no call succeeded.
    async fn search_all(&self, profile: &SiteProfile) -> Result<Vec<SearchResult>, BrowserError> {
        let mut merged = Vec::new();
        let mut succeeded = 0usize;
        let mut last_error = None;
        let mut first_call = true;

        for provider in SearchProvider::ALL {
            for alias in profile
                .query_aliases
                .iter()
                .take(self.settings.max_aliases_per_provider)
            {
                if !first_call && !self.settings.inter_alias_delay.is_zero() {
                    tokio::time::sleep(self.settings.inter_alias_delay).await;
                }
                first_call = false;

                match self.search.run_search(provider, alias).await {
                    Ok(results) => {
                        debug!(
                            "{} search {:?} returned {} items",
                            provider.as_str(),
                            alias,
                            results.len()
                        );
                        succeeded += 1;
                        merged.extend(results);
                    }
                    Err(e) => {
                        warn!("{} search {:?} failed: {}", provider.as_str(), alias, e);
                        self.stats.increment_error(match e {
                            BrowserError::Timeout => ErrorType::BrowserTimeout,
                            BrowserError::Unavailable(_) => ErrorType::BrowserUnavailable,
                        });
                        last_error = Some(e);
                    }
                }
            }
        }

        match last_error {
            Some(e) if succeeded == 0 => Err(e),
            _ => Ok(merged),
        }
    }
}
