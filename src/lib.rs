//! mirror_status library: tracks the reachable mirror of each monitored site
//!
//! Sites move between domains frequently. For every logical site name the
//! library searches the web through a headless browser, filters the results
//! down to candidate mirrors, probes them and records the first one that
//! answers. A scheduler repeats this for the configured sites and emits an
//! event whenever a site goes down, recovers or changes its domain.
//!
//! # Example
//!
//! ```no_run
//! use mirror_status::{run_service, Config};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config {
//!     browserless_api_key: "token".to_string(),
//!     status_port: Some(8080),
//!     ..Default::default()
//! };
//! run_service(config).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime.

mod app;
pub mod api;
pub mod browser;
pub mod catalog;
pub mod config;
pub mod error_handling;
pub mod extract;
pub mod initialization;
pub mod models;
pub mod monitor;
pub mod notifier;
pub mod probe;
pub mod resolver;
pub mod status_server;
pub mod storage;

// Re-export public API
pub use api::{CoreApi, HealthReport, HealthStatus};
pub use config::{Config, LogFormat, LogLevel, Opt};
pub use error_handling::{ApiError, SweepError};
pub use models::{SearchResult, SiteRecord, SiteStatus};
pub use service::{build_service, run_service, Service};
pub use storage::run_migrations;

mod service {
    use std::sync::Arc;
    use std::time::Instant;

    use anyhow::{Context, Result};
    use log::{info, warn};
    use sqlx::{Pool, Sqlite};
    use tokio::task::JoinHandle;
    use tokio_util::sync::CancellationToken;

    use crate::api::CoreApi;
    use crate::app::{print_error_statistics, shutdown_gracefully};
    use crate::browser::BrowserlessClient;
    use crate::catalog::SiteCatalog;
    use crate::config::{Config, NOTIFIER_QUEUE_CAPACITY};
    use crate::error_handling::ProcessingStats;
    use crate::initialization::{init_browser_client, init_notifier_client, init_probe_client};
    use crate::monitor::{spawn_scheduler, Monitor, MonitorSettings};
    use crate::notifier::{LogNotifier, Notifier, WebhookNotifier};
    use crate::probe::HttpProber;
    use crate::resolver::{ResolverSettings, SiteResolver};
    use crate::status_server::{start_status_server, StatusState};
    use crate::storage::{init_db_pool_with_path, run_migrations, SqliteSiteRepository};

    /// The wired components of a running service.
    pub struct Service {
        pub api: Arc<CoreApi>,
        pub monitor: Arc<Monitor>,
        pub stats: Arc<ProcessingStats>,
        /// Delivery task of the webhook notifier, if one is configured
        pub notifier_worker: Option<JoinHandle<()>>,
        notifier_shutdown: CancellationToken,
    }

    impl Service {
        /// Stops sweeps, waits for every running sweep to record its results,
        /// then drains the notifier.
        ///
        /// # Arguments
        ///
        /// * `sweeps` - The token passed to `build_service` and the scheduler
        /// * `scheduler` - Handle returned by `spawn_scheduler`
        /// * `status_server` - Handle of the status server task, if started
        pub async fn shutdown(
            self,
            sweeps: CancellationToken,
            scheduler: JoinHandle<()>,
            status_server: Option<JoinHandle<()>>,
        ) {
            shutdown_gracefully(
                sweeps,
                scheduler,
                &self.monitor,
                status_server,
                self.notifier_shutdown,
                self.notifier_worker,
            )
            .await;
        }
    }

    /// Wires the production components on top of an open pool.
    ///
    /// `sweeps` stops the monitor's sweeps. The notifier worker has its own
    /// token, cancelled by `Service::shutdown` once no sweep is running.
    ///
    /// # Errors
    ///
    /// Returns an error if an HTTP client cannot be built.
    pub fn build_service(
        config: &Config,
        pool: Arc<Pool<Sqlite>>,
        sweeps: CancellationToken,
    ) -> Result<Service> {
        let stats = Arc::new(ProcessingStats::new());

        let browser_client =
            init_browser_client(config).context("Failed to initialize browser client")?;
        let search = Arc::new(BrowserlessClient::new(
            browser_client,
            &config.browserless_url,
            &config.browserless_api_key,
            config.inter_alias_delay,
        ));
        let probe_client = init_probe_client(config).context("Failed to initialize probe client")?;
        let prober = Arc::new(HttpProber::new(probe_client, Arc::clone(&stats)));

        let notifier_shutdown = CancellationToken::new();
        let (notifier, notifier_worker): (Arc<dyn Notifier>, Option<JoinHandle<()>>) =
            match &config.notifier_url {
                Some(url) => {
                    let client =
                        init_notifier_client().context("Failed to initialize notifier client")?;
                    let (notifier, worker) = WebhookNotifier::start(
                        url.clone(),
                        client,
                        NOTIFIER_QUEUE_CAPACITY,
                        Arc::clone(&stats),
                        notifier_shutdown.clone(),
                    );
                    info!("Notifications go to {}", url);
                    (Arc::new(notifier) as Arc<dyn Notifier>, Some(worker))
                }
                None => {
                    info!("No notifier URL configured, events are only logged");
                    (Arc::new(LogNotifier) as Arc<dyn Notifier>, None)
                }
            };

        let resolver = Arc::new(SiteResolver::new(
            search,
            prober,
            SiteCatalog::builtin(),
            ResolverSettings::from(config),
            Arc::clone(&stats),
        ));
        let repository = Arc::new(SqliteSiteRepository::new(pool));
        let monitor = Arc::new(Monitor::new(
            Arc::clone(&resolver),
            repository.clone(),
            Arc::clone(&notifier),
            MonitorSettings::from(config),
            Arc::clone(&stats),
            sweeps,
        ));
        let api = Arc::new(CoreApi::new(
            resolver,
            repository,
            Arc::clone(&monitor),
            notifier,
            config,
        ));

        Ok(Service {
            api,
            monitor,
            stats,
            notifier_worker,
            notifier_shutdown,
        })
    }

    /// Runs the service until Ctrl-C.
    ///
    /// Opens the database, starts the scheduler (and the status server when a
    /// port is configured), then shuts everything down gracefully.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the database or an
    /// HTTP client cannot be initialized.
    pub async fn run_service(config: Config) -> Result<()> {
        config.validate().context("Invalid configuration")?;

        let pool = init_db_pool_with_path(&config.db_path)
            .await
            .context("Failed to initialize database pool")?;
        run_migrations(&pool)
            .await
            .context("Failed to run database migrations")?;

        let cancel = CancellationToken::new();
        let service = build_service(&config, Arc::clone(&pool), cancel.clone())?;
        info!(
            "Monitoring {} sites: {}",
            config.sites.len(),
            config.sites.join(", ")
        );

        let status_server = config.status_port.map(|port| {
            let state = StatusState {
                api: Arc::clone(&service.api),
                monitor: Arc::clone(&service.monitor),
                error_stats: Arc::clone(&service.stats),
                start_time: Arc::new(Instant::now()),
            };
            let shutdown = cancel.clone();
            tokio::spawn(async move {
                if let Err(e) = start_status_server(port, state, shutdown).await {
                    warn!("Status server error: {}", e);
                }
            })
        });

        let scheduler = spawn_scheduler(Arc::clone(&service.monitor), cancel.clone());

        tokio::signal::ctrl_c()
            .await
            .context("Failed to listen for shutdown signal")?;
        info!("Shutdown requested, stopping after the current site");

        let stats = Arc::clone(&service.stats);
        service.shutdown(cancel, scheduler, status_server).await;
        print_error_statistics(&stats);

        if let Err(e) = sqlx::query("PRAGMA wal_checkpoint(TRUNCATE)")
            .execute(pool.as_ref())
            .await
        {
            warn!("Failed to checkpoint WAL file (this is non-critical): {}", e);
        }
        pool.close().await;
        Ok(())
    }
}
