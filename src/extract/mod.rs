//! Candidate URL extraction.
//!
//! Turns raw search results into the ordered, de-duplicated list of URLs
//! that belong to one site.

mod denylist;

use std::collections::HashSet;
use std::sync::LazyLock;

use log::debug;
use regex::Regex;
use url::Url;

use crate::catalog::SiteProfile;
use crate::models::SearchResult;

pub use denylist::is_denied_host;

/// Absolute http(s) URL whose host has at least one dot. Searched for inside
/// the item text rather than matched against all of it.
static URL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)https?://[a-z0-9](?:[a-z0-9-]*[a-z0-9])?(?:\.[a-z0-9](?:[a-z0-9-]*[a-z0-9])?)+(?::\d{1,5})?(?:[/?#][^\s<>\x22']*)?")
        .expect("URL regex is valid")
});

/// Extracts the candidate URLs for `profile` from `results`.
///
/// Items without a URL, denied hosts and hosts not matching the profile's
/// domain pattern are dropped. The remaining URLs are normalized and returned
/// in first-seen order without duplicates.
pub fn extract(results: &[SearchResult], profile: &SiteProfile) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut candidates = Vec::new();

    for result in results {
        let Some(found) = URL_REGEX.find(&result.url) else {
            continue;
        };
        let Ok(url) = Url::parse(found.as_str()) else {
            continue;
        };
        let Some(host) = url.host_str() else {
            continue;
        };
        if !host.contains('.') || is_denied_host(host) {
            continue;
        }
        if !profile.matches_host(host) {
            debug!("Skipping {} for {}: host does not match", host, profile.name);
            continue;
        }

        let normalized = normalize_url(url);
        if seen.insert(normalized.clone()) {
            candidates.push(normalized);
        }
    }

    candidates
}

/// Canonical form used for de-duplication.
///
/// Scheme and host are lowercased by the parser; the fragment is removed and a
/// trailing slash is kept only for the root path.
pub fn normalize_url(mut url: Url) -> String {
    url.set_fragment(None);
    let path = url.path().to_string();
    if path.len() > 1 && path.ends_with('/') {
        url.set_path(path.trim_end_matches('/'));
    }
    url.to_string()
}
