//! Configuration types and CLI options.
//!
//! `Config` is the library configuration and can be built without any CLI
//! dependency; `Opt` is the `clap` parser used by the binary.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};

use crate::config::constants::*;
use crate::error_handling::InitializationError;

/// Logging level for the application.
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Library configuration.
///
/// # Examples
///
/// ```no_run
/// use mirror_status::Config;
///
/// let config = Config {
///     browserless_api_key: "secret".to_string(),
///     notifier_url: Some("https://hooks.example.com/monitor".to_string()),
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Browser automation base URL
    pub browserless_url: String,

    /// Token appended to the function URL
    pub browserless_api_key: String,

    /// Period of the full sweep
    pub full_sweep_interval: Duration,

    /// Period of the catch-up sweep
    pub stale_check_interval: Duration,

    /// Sleep between sites in a sweep
    pub per_site_delay: Duration,

    /// Sleep between search calls
    pub inter_alias_delay: Duration,

    /// Reachability probe timeout
    pub probe_timeout: Duration,

    /// Search script execution timeout
    pub browser_timeout: Duration,

    /// How long past a missed sweep a record may go unchecked before health degrades
    pub alert_threshold: Duration,

    /// Aliases searched per provider
    pub max_aliases_per_provider: usize,

    /// Webhook receiving monitoring events; events are only logged when unset
    pub notifier_url: Option<String>,

    /// Database path (SQLite file)
    pub db_path: PathBuf,

    /// User-Agent sent by the prober
    pub user_agent: String,

    /// Sites checked by the full sweep, in order
    pub sites: Vec<String>,

    /// HTTP status server port (disabled when `None`)
    pub status_port: Option<u16>,

    /// Log level
    pub log_level: LogLevel,

    /// Log format
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            browserless_url: DEFAULT_BROWSERLESS_URL.to_string(),
            browserless_api_key: String::new(),
            full_sweep_interval: DEFAULT_FULL_SWEEP_INTERVAL,
            stale_check_interval: DEFAULT_STALE_CHECK_INTERVAL,
            per_site_delay: DEFAULT_PER_SITE_DELAY,
            inter_alias_delay: DEFAULT_INTER_ALIAS_DELAY,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            browser_timeout: DEFAULT_BROWSER_TIMEOUT,
            alert_threshold: DEFAULT_ALERT_THRESHOLD,
            max_aliases_per_provider: DEFAULT_MAX_ALIASES_PER_PROVIDER,
            notifier_url: None,
            db_path: PathBuf::from(DB_PATH),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            sites: DEFAULT_SITES.iter().map(|s| s.to_string()).collect(),
            status_port: None,
            log_level: LogLevel::Info,
            log_format: LogFormat::Plain,
        }
    }
}

impl Config {
    /// Rejects configurations the service cannot run with.
    pub fn validate(&self) -> Result<(), InitializationError> {
        if self.browserless_api_key.trim().is_empty() {
            return Err(InitializationError::InvalidConfig(
                "browserless API key is required".to_string(),
            ));
        }
        if url::Url::parse(&self.browserless_url).is_err() {
            return Err(InitializationError::InvalidConfig(format!(
                "browserless URL is not a valid URL: {}",
                self.browserless_url
            )));
        }
        if self.full_sweep_interval.is_zero() || self.stale_check_interval.is_zero() {
            return Err(InitializationError::InvalidConfig(
                "sweep intervals must be greater than zero".to_string(),
            ));
        }
        if self.max_aliases_per_provider == 0 {
            return Err(InitializationError::InvalidConfig(
                "max aliases per provider must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Command-line options.
///
/// Every option can also be supplied through the environment (or a `.env` file).
///
/// ```bash
/// BROWSERLESS_API_KEY=... mirror_status --notifier-url https://hooks.example.com/monitor
/// ```
#[derive(Debug, Parser)]
#[command(
    name = "mirror_status",
    about = "Tracks the currently reachable mirror of each configured site and alerts on changes."
)]
pub struct Opt {
    /// Browser automation base URL
    #[arg(long, env = "BROWSERLESS_URL", default_value = DEFAULT_BROWSERLESS_URL)]
    pub browserless_url: String,

    /// Browser automation API token
    #[arg(long, env = "BROWSERLESS_API_KEY", hide_env_values = true)]
    pub browserless_api_key: String,

    /// Webhook that receives monitoring events
    #[arg(long, env = "NOTIFIER_URL")]
    pub notifier_url: Option<String>,

    /// Database path (SQLite file)
    #[arg(long, env = "MIRROR_STATUS_DB", value_parser, default_value = DB_PATH)]
    pub db_path: PathBuf,

    /// Full sweep period in seconds
    #[arg(long, env = "FULL_SWEEP_INTERVAL_SECS", default_value_t = DEFAULT_FULL_SWEEP_INTERVAL.as_secs())]
    pub full_sweep_interval_secs: u64,

    /// Stale check period in seconds
    #[arg(long, env = "STALE_CHECK_INTERVAL_SECS", default_value_t = DEFAULT_STALE_CHECK_INTERVAL.as_secs())]
    pub stale_check_interval_secs: u64,

    /// Delay between sites within a sweep, in milliseconds
    #[arg(long, env = "PER_SITE_DELAY_MS", default_value_t = DEFAULT_PER_SITE_DELAY.as_millis() as u64)]
    pub per_site_delay_ms: u64,

    /// Delay between search calls, in milliseconds
    #[arg(long, env = "INTER_ALIAS_DELAY_MS", default_value_t = DEFAULT_INTER_ALIAS_DELAY.as_millis() as u64)]
    pub inter_alias_delay_ms: u64,

    /// Reachability probe timeout in seconds
    #[arg(long, env = "PROBE_TIMEOUT_SECS", default_value_t = DEFAULT_PROBE_TIMEOUT.as_secs())]
    pub probe_timeout_secs: u64,

    /// Minutes a record may stay unchecked past a sweep before health degrades
    #[arg(long, env = "ALERT_THRESHOLD_MINUTES", default_value_t = DEFAULT_ALERT_THRESHOLD.as_secs() / 60)]
    pub alert_threshold_minutes: u64,

    /// Search aliases tried per provider
    #[arg(long, default_value_t = DEFAULT_MAX_ALIASES_PER_PROVIDER)]
    pub max_aliases_per_provider: usize,

    /// Sites to monitor (comma separated); defaults to the built-in list
    #[arg(long, env = "MIRROR_STATUS_SITES", value_delimiter = ',')]
    pub sites: Vec<String>,

    /// User-Agent sent when probing candidate URLs
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Port for the HTTP status server (disabled if not set)
    #[arg(long, env = "STATUS_PORT")]
    pub status_port: Option<u16>,

    /// Log level: error|warn|info|debug|trace
    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format: plain|json
    #[arg(long, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,
}

impl From<Opt> for Config {
    fn from(opt: Opt) -> Self {
        let sites = if opt.sites.is_empty() {
            DEFAULT_SITES.iter().map(|s| s.to_string()).collect()
        } else {
            opt.sites
                .into_iter()
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect()
        };

        Config {
            browserless_url: opt.browserless_url,
            browserless_api_key: opt.browserless_api_key,
            full_sweep_interval: Duration::from_secs(opt.full_sweep_interval_secs),
            stale_check_interval: Duration::from_secs(opt.stale_check_interval_secs),
            per_site_delay: Duration::from_millis(opt.per_site_delay_ms),
            inter_alias_delay: Duration::from_millis(opt.inter_alias_delay_ms),
            probe_timeout: Duration::from_secs(opt.probe_timeout_secs),
            browser_timeout: DEFAULT_BROWSER_TIMEOUT,
            alert_threshold: Duration::from_secs(opt.alert_threshold_minutes * 60),
            max_aliases_per_provider: opt.max_aliases_per_provider,
            notifier_url: opt.notifier_url.filter(|u| !u.trim().is_empty()),
            db_path: opt.db_path,
            user_agent: opt.user_agent,
            sites,
            status_port: opt.status_port,
            log_level: opt.log_level,
            log_format: opt.log_format,
        }
    }
}
