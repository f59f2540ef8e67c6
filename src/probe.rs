//! Reachability probing of candidate URLs.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use log::debug;
use reqwest::StatusCode;
use serde::Serialize;

use crate::error_handling::{categorize_probe_error, ErrorType, ProcessingStats};

/// Result of one probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProbeOutcome {
    /// True iff the final response was 2xx
    pub reachable: bool,
    /// Time until the response or the failure
    pub latency_ms: i64,
    /// Final HTTP status, 0 when no response was received
    pub observed_status: u16,
}

impl ProbeOutcome {
    pub fn reachable(latency_ms: i64) -> Self {
        ProbeOutcome {
            reachable: true,
            latency_ms,
            observed_status: 200,
        }
    }

    pub fn unreachable(latency_ms: i64, observed_status: u16) -> Self {
        ProbeOutcome {
            reachable: false,
            latency_ms,
            observed_status,
        }
    }
}

/// Checks whether a URL currently answers.
#[async_trait]
pub trait Prober: Send + Sync {
    async fn probe(&self, url: &str) -> ProbeOutcome;
}

/// Probes with a HEAD request, falling back to GET when HEAD is refused.
///
/// Timeout, redirect cap and User-Agent come from the client, see
/// `initialization::init_probe_client`.
pub struct HttpProber {
    client: Arc<reqwest::Client>,
    stats: Arc<ProcessingStats>,
}

impl HttpProber {
    pub fn new(client: Arc<reqwest::Client>, stats: Arc<ProcessingStats>) -> Self {
        HttpProber { client, stats }
    }

    async fn send(&self, method: reqwest::Method, url: &str) -> Result<StatusCode, reqwest::Error> {
        let response = self.client.request(method, url).send().await?;
        Ok(response.status())
    }
}

fn elapsed_ms(start: Instant) -> i64 {
    i64::try_from(start.elapsed().as_millis()).unwrap_or(i64::MAX)
}

#[async_trait]
impl Prober for HttpProber {
    async fn probe(&self, url: &str) -> ProbeOutcome {
        let start = Instant::now();

        let mut result = self.send(reqwest::Method::HEAD, url).await;
        if let Ok(status) = result {
            if status == StatusCode::METHOD_NOT_ALLOWED || status == StatusCode::NOT_IMPLEMENTED {
                debug!("HEAD refused by {url} ({status}), retrying with GET");
                result = self.send(reqwest::Method::GET, url).await;
            }
        }
        let latency_ms = elapsed_ms(start);

        match result {
            Ok(status) if status.is_success() => {
                debug!("{url} reachable ({status}) in {latency_ms}ms");
                ProbeOutcome {
                    reachable: true,
                    latency_ms,
                    observed_status: status.as_u16(),
                }
            }
            Ok(status) => {
                debug!("{url} answered {status} in {latency_ms}ms");
                self.stats.increment_error(ErrorType::ProbeHttpStatus);
                ProbeOutcome::unreachable(latency_ms, status.as_u16())
            }
            Err(e) => {
                debug!("{url} unreachable after {latency_ms}ms: {e}");
                self.stats.increment_error(categorize_probe_error(&e));
                ProbeOutcome::unreachable(latency_ms, 0)
            }
        }
    }
}
