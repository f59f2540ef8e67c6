//! Headless-browser search client.
//!
//! Runs a provider-specific automation script on a browserless-compatible
//! endpoint and returns the `{title, url}` items the script scraped from the
//! results page.

mod pacing;
mod script;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error_handling::BrowserError;
use crate::models::SearchResult;

pub use pacing::Pacer;
pub use script::{build_search_script, js_string_literal};

/// A search engine driven through the automation endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchProvider {
    /// General-purpose engine, tried first
    Primary,
    /// Privacy-oriented engine
    Secondary,
}

impl SearchProvider {
    /// Providers in precedence order.
    pub const ALL: [SearchProvider; 2] = [SearchProvider::Primary, SearchProvider::Secondary];

    pub fn as_str(self) -> &'static str {
        match self {
            SearchProvider::Primary => "primary",
            SearchProvider::Secondary => "secondary",
        }
    }
}

/// Runs one search and returns the raw result items.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn run_search(
        &self,
        provider: SearchProvider,
        query: &str,
    ) -> Result<Vec<SearchResult>, BrowserError>;
}

#[derive(Deserialize)]
struct RawItem {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

/// Client for the `/function` endpoint of a browserless deployment.
pub struct BrowserlessClient {
    client: Arc<reqwest::Client>,
    function_url: String,
    api_key: String,
    primary_pacer: Pacer,
    secondary_pacer: Pacer,
}

impl BrowserlessClient {
    /// `min_interval` is the spacing enforced between calls to the same provider.
    pub fn new(
        client: Arc<reqwest::Client>,
        base_url: &str,
        api_key: &str,
        min_interval: Duration,
    ) -> Self {
        BrowserlessClient {
            client,
            function_url: format!("{}/function", base_url.trim_end_matches('/')),
            api_key: api_key.to_string(),
            primary_pacer: Pacer::new(min_interval),
            secondary_pacer: Pacer::new(min_interval),
        }
    }

    fn pacer(&self, provider: SearchProvider) -> &Pacer {
        match provider {
            SearchProvider::Primary => &self.primary_pacer,
            SearchProvider::Secondary => &self.secondary_pacer,
        }
    }
}

#[async_trait]
impl SearchBackend for BrowserlessClient {
    async fn run_search(
        &self,
        provider: SearchProvider,
        query: &str,
    ) -> Result<Vec<SearchResult>, BrowserError> {
        self.pacer(provider).wait_turn().await;

        let body = json!({
            "code": build_search_script(provider, query),
            "context": {},
        });
        debug!("Running {} search for {:?}", provider.as_str(), query);

        let response = self
            .client
            .post(&self.function_url)
            .query(&[("token", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(BrowserError::Unavailable(format!("HTTP {}", status.as_u16())));
        }

        let text = response.text().await.map_err(map_transport_error)?;
        parse_search_results(&text)
    }
}

fn map_transport_error(e: reqwest::Error) -> BrowserError {
    if e.is_timeout() {
        BrowserError::Timeout
    } else {
        BrowserError::Unavailable(e.to_string())
    }
}

/// Decodes the script output.
///
/// The endpoint returns either the array itself or the string produced by
/// `JSON.stringify`, so a top-level string is decoded a second time. Items
/// without a URL are dropped.
pub fn parse_search_results(body: &str) -> Result<Vec<SearchResult>, BrowserError> {
    let malformed = |e: serde_json::Error| BrowserError::Unavailable(format!("malformed body: {e}"));

    let mut value: Value = serde_json::from_str(body.trim()).map_err(malformed)?;
    if let Value::String(inner) = value {
        value = serde_json::from_str(inner.trim()).map_err(malformed)?;
    }
    let items: Vec<RawItem> = serde_json::from_value(value).map_err(malformed)?;

    Ok(items
        .into_iter()
        .filter_map(|item| {
            let url = item.url.filter(|u| !u.trim().is_empty())?;
            Some(SearchResult::new(item.title.unwrap_or_default(), url))
        })
        .collect())
}
