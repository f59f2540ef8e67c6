//! Graceful shutdown handling.

use log::{info, warn};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::monitor::Monitor;

/// Shuts down all background tasks gracefully.
///
/// # Behavior
///
/// 1. Cancels `sweeps` and waits for the scheduler, which returns at the next
///    site boundary of a running sweep.
/// 2. Waits until no sweep holds the monitor lock. This covers sweeps started
///    by a manual refresh, which run on their own task.
/// 3. Waits for the status server.
/// 4. Only then cancels `notifier`, so the notifier worker still accepts the
///    transitions and the summary of the interrupted sweep. The worker
///    delivers its queue before exiting.
pub async fn shutdown_gracefully(
    sweeps: CancellationToken,
    scheduler: JoinHandle<()>,
    monitor: &Monitor,
    status_server: Option<JoinHandle<()>>,
    notifier: CancellationToken,
    notifier_worker: Option<JoinHandle<()>>,
) {
    sweeps.cancel();

    if let Err(e) = scheduler.await {
        warn!("Scheduler task ended abnormally: {e}");
    }
    monitor.wait_idle().await;
    if let Some(status_server) = status_server {
        let _ = status_server.await;
    }

    notifier.cancel();
    if let Some(notifier_worker) = notifier_worker {
        if let Err(e) = notifier_worker.await {
            warn!("Notifier worker ended abnormally: {e}");
        }
    }
    info!("Shutdown complete");
}
