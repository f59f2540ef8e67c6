//! Error handling and processing statistics.
//!
//! This module provides:
//! - Error type definitions for every component and the façade
//! - Processing statistics tracking for swallowed transient failures
//! - The retry strategy used by the webhook notifier

mod stats;
mod types;

use std::time::Duration;
use tokio_retry::strategy::ExponentialBackoff;

pub use stats::ProcessingStats;
pub use types::{ApiError, BrowserError, DatabaseError, ErrorType, InitializationError, SweepError};

/// Creates an exponential backoff retry strategy.
///
/// Starts at `RETRY_INITIAL_DELAY_MS`, multiplies by `RETRY_FACTOR`, caps each
/// delay at `RETRY_MAX_DELAY_SECS` and yields at most `RETRY_MAX_ATTEMPTS - 1`
/// delays (initial attempt + retries = `RETRY_MAX_ATTEMPTS`).
pub fn get_retry_strategy() -> impl Iterator<Item = Duration> {
    ExponentialBackoff::from_millis(crate::config::RETRY_INITIAL_DELAY_MS)
        .factor(crate::config::RETRY_FACTOR)
        .max_delay(Duration::from_secs(crate::config::RETRY_MAX_DELAY_SECS))
        .take(crate::config::RETRY_MAX_ATTEMPTS - 1)
}

/// Maps a probe transport failure onto its counter.
pub fn categorize_probe_error(error: &reqwest::Error) -> ErrorType {
    if error.is_timeout() {
        ErrorType::ProbeTimeout
    } else if error.is_redirect() {
        ErrorType::ProbeRedirectError
    } else if error.is_connect() {
        ErrorType::ProbeConnectError
    } else {
        ErrorType::ProbeOtherError
    }
}
