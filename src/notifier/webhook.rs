//! Webhook delivery of monitoring events.

use std::sync::Arc;

use chrono::Utc;
use log::{debug, warn};
use serde_json::json;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::{MonitorEvent, Notifier};
use crate::error_handling::{get_retry_strategy, ErrorType, ProcessingStats};

/// Posts each event to a webhook from a background task.
///
/// `emit` only enqueues onto a bounded channel; when the queue is full the
/// event is dropped and counted as `NotifierDropped`.
pub struct WebhookNotifier {
    sender: mpsc::Sender<MonitorEvent>,
    stats: Arc<ProcessingStats>,
}

impl WebhookNotifier {
    /// Starts the delivery task.
    ///
    /// After `shutdown` is cancelled the task stops accepting events, delivers
    /// what is already queued and exits.
    pub fn start(
        url: String,
        client: reqwest::Client,
        capacity: usize,
        stats: Arc<ProcessingStats>,
        shutdown: CancellationToken,
    ) -> (Self, JoinHandle<()>) {
        let (sender, receiver) = mpsc::channel(capacity);
        let worker = tokio::spawn(delivery_loop(
            url,
            client,
            receiver,
            Arc::clone(&stats),
            shutdown,
        ));
        (WebhookNotifier { sender, stats }, worker)
    }
}

impl Notifier for WebhookNotifier {
    fn emit(&self, event: MonitorEvent) {
        if let Err(e) = self.sender.try_send(event) {
            let event = match e {
                mpsc::error::TrySendError::Full(event) | mpsc::error::TrySendError::Closed(event) => {
                    event
                }
            };
            warn!("Dropping {} event: notifier queue unavailable", event.action());
            self.stats.increment_error(ErrorType::NotifierDropped);
        }
    }
}

async fn delivery_loop(
    url: String,
    client: reqwest::Client,
    mut receiver: mpsc::Receiver<MonitorEvent>,
    stats: Arc<ProcessingStats>,
    shutdown: CancellationToken,
) {
    loop {
        tokio::select! {
            event = receiver.recv() => match event {
                Some(event) => deliver(&client, &url, &event, &stats).await,
                None => return,
            },
            _ = shutdown.cancelled() => break,
        }
    }

    receiver.close();
    while let Some(event) = receiver.recv().await {
        deliver(&client, &url, &event, &stats).await;
    }
    debug!("Notifier worker stopped");
}

async fn deliver(client: &reqwest::Client, url: &str, event: &MonitorEvent, stats: &ProcessingStats) {
    let body = json!({
        "action": event.action(),
        "payload": event.payload(),
        "timestamp": Utc::now().to_rfc3339(),
    });

    let result = tokio_retry::Retry::spawn(get_retry_strategy(), || {
        let request = client.post(url).json(&body);
        async move {
            request
                .send()
                .await
                .and_then(|response| response.error_for_status())
                .map(|_| ())
        }
    })
    .await;

    match result {
        Ok(()) => debug!("Delivered {} event", event.action()),
        Err(e) => {
            warn!("Failed to deliver {} event after retries: {}", event.action(), e);
            stats.increment_error(ErrorType::NotifierDeliveryFailed);
        }
    }
}
