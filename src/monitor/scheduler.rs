//! Periodic sweep scheduling.

use std::sync::Arc;

use log::{debug, error, info};
use tokio::task::JoinHandle;
use tokio::time::{interval, interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use super::Monitor;
use crate::error_handling::SweepError;

/// Spawns the scheduler loop.
///
/// The first full sweep starts immediately, later ones every
/// `full_sweep_interval`; the stale check first runs one
/// `stale_check_interval` after start. A tick that finds a sweep still
/// running is skipped, never queued. The loop exits when `cancel` fires.
pub fn spawn_scheduler(monitor: Arc<Monitor>, cancel: CancellationToken) -> JoinHandle<()> {
    tokio::spawn(async move {
        let settings = monitor.settings().clone();

        let mut full = interval(settings.full_sweep_interval);
        full.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut stale = interval_at(
            Instant::now() + settings.stale_check_interval,
            settings.stale_check_interval,
        );
        stale.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(
            "Scheduler started: full sweep every {:?}, stale check every {:?}",
            settings.full_sweep_interval, settings.stale_check_interval
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = full.tick() => match monitor.run_full_sweep().await {
                    Ok(_) => {}
                    Err(SweepError::Busy) => info!("Scheduled full sweep skipped: a sweep is already running"),
                    Err(SweepError::Cancelled) => break,
                    Err(e) => error!("Scheduled full sweep failed: {}", e),
                },
                _ = stale.tick() => match monitor.run_stale_check().await {
                    Ok(checked) => debug!("Stale check re-resolved {} sites", checked),
                    Err(SweepError::Busy) => info!("Stale check skipped: a sweep is already running"),
                    Err(SweepError::Cancelled) => break,
                    Err(e) => error!("Stale check failed: {}", e),
                },
            }
        }

        info!("Scheduler stopped");
    })
}
