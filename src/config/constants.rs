//! Configuration constants.
//!
//! Defaults for every tunable plus the fixed operational limits of the
//! browser client, the prober and the notifier.

use std::time::Duration;

pub const DB_PATH: &str = "./mirror_status.db";

/// Default browser automation endpoint.
pub const DEFAULT_BROWSERLESS_URL: &str = "https://chrome.browserless.io";

// Scheduler defaults
/// Period of the full sweep (6 hours)
pub const DEFAULT_FULL_SWEEP_INTERVAL: Duration = Duration::from_secs(6 * 60 * 60);
/// Period of the catch-up stale check (1 hour)
pub const DEFAULT_STALE_CHECK_INTERVAL: Duration = Duration::from_secs(60 * 60);
/// Sleep between sites within a sweep
pub const DEFAULT_PER_SITE_DELAY: Duration = Duration::from_secs(3);
/// Sleep between search calls, also the browser client's minimum request spacing
pub const DEFAULT_INTER_ALIAS_DELAY: Duration = Duration::from_millis(1500);
/// Minutes past a missed sweep before health degrades
pub const DEFAULT_ALERT_THRESHOLD: Duration = Duration::from_secs(30 * 60);

// Network operation timeouts
/// Reachability probe timeout
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);
/// Search script execution timeout
pub const DEFAULT_BROWSER_TIMEOUT: Duration = Duration::from_secs(30);
/// Webhook delivery timeout per attempt
pub const NOTIFIER_TIMEOUT: Duration = Duration::from_secs(10);

/// Maximum number of redirect hops a probe follows
pub const MAX_PROBE_REDIRECTS: usize = 3;

/// Aliases searched per provider
pub const DEFAULT_MAX_ALIASES_PER_PROVIDER: usize = 3;

/// Window used by `statistics()` for "recently updated"
pub const RECENTLY_UPDATED_WINDOW: Duration = Duration::from_secs(24 * 60 * 60);

/// Desktop browser User-Agent sent by the prober.
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

// Notifier queue and retry strategy
/// Events buffered before `emit` starts dropping
pub const NOTIFIER_QUEUE_CAPACITY: usize = 256;
/// Initial delay in milliseconds before first webhook retry
pub const RETRY_INITIAL_DELAY_MS: u64 = 500;
/// Factor by which retry delay is multiplied on each attempt
pub const RETRY_FACTOR: u64 = 2;
/// Maximum delay between retries in seconds
pub const RETRY_MAX_DELAY_SECS: u64 = 15;
/// Maximum number of webhook attempts (including initial attempt)
pub const RETRY_MAX_ATTEMPTS: usize = 3;

/// Health thresholds in percent of working sites
pub const HEALTHY_UPTIME_PCT: f64 = 80.0;
pub const DEGRADED_UPTIME_PCT: f64 = 50.0;

/// Longest accepted logical site name.
pub const MAX_SITE_NAME_LEN: usize = 64;

/// Sites checked by the full sweep, in sweep order.
pub const DEFAULT_SITES: &[&str] = &[
    "movierulz",
    "moviezap",
    "tamilrockers",
    "filmywap",
    "worldfree4u",
    "9xmovies",
    "khatrimaza",
    "bolly4u",
];
