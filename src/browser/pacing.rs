//! Inter-request pacing.
//!
//! One `Pacer` per provider. Callers for different sites share it, so the
//! aggregate request rate against a provider stays bounded even when ad-hoc
//! resolves run concurrently with a sweep.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

/// Enforces a minimum spacing between consecutive requests.
pub struct Pacer {
    min_interval: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl Pacer {
    pub fn new(min_interval: Duration) -> Self {
        Pacer {
            min_interval,
            last_request: Mutex::new(None),
        }
    }

    /// Waits until `min_interval` has passed since the previous request, then
    /// stamps the current request.
    ///
    /// The lock is held across the sleep, so waiters are released one at a time.
    pub async fn wait_turn(&self) {
        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.min_interval {
                tokio::time::sleep(self.min_interval - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }
}
