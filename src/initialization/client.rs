//! HTTP client initialization.
//!
//! One client per outbound concern, each with its own timeout and redirect
//! behaviour.

use std::sync::Arc;

use reqwest::redirect::Policy;
use reqwest::ClientBuilder;

use crate::config::{Config, MAX_PROBE_REDIRECTS, NOTIFIER_TIMEOUT};

/// Initializes the client used to probe candidate URLs.
///
/// Creates a `reqwest::Client` configured with:
/// - the desktop browser User-Agent from the config
/// - the probe timeout
/// - redirect following capped at `MAX_PROBE_REDIRECTS` hops
///
/// # Errors
///
/// Returns a `reqwest::Error` if client creation fails.
pub fn init_probe_client(config: &Config) -> Result<Arc<reqwest::Client>, reqwest::Error> {
    let client = ClientBuilder::new()
        .timeout(config.probe_timeout)
        .user_agent(config.user_agent.clone())
        .redirect(Policy::limited(MAX_PROBE_REDIRECTS))
        .build()?;
    Ok(Arc::new(client))
}

/// Initializes the client used for the browser automation endpoint.
///
/// The timeout covers the whole script execution on the remote browser.
pub fn init_browser_client(config: &Config) -> Result<Arc<reqwest::Client>, reqwest::Error> {
    let client = ClientBuilder::new()
        .timeout(config.browser_timeout)
        .build()?;
    Ok(Arc::new(client))
}

/// Initializes the client used for webhook delivery.
pub fn init_notifier_client() -> Result<reqwest::Client, reqwest::Error> {
    ClientBuilder::new().timeout(NOTIFIER_TIMEOUT).build()
}
