//! Monitoring events and their delivery.
//!
//! The core only calls [`Notifier::emit`], which must return immediately.
//! Delivery, retries and drops are the notifier's business.

mod webhook;

use chrono::{DateTime, Utc};
use log::info;
use serde::Serialize;

use crate::models::SiteStatus;

pub use webhook::WebhookNotifier;

/// A change of a site's status or working URL.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusTransition {
    pub site_name: String,
    pub from: SiteStatus,
    pub to: SiteStatus,
    pub old_url: Option<String>,
    pub new_url: Option<String>,
    pub at: DateTime<Utc>,
}

/// Totals of one full sweep.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SweepSummary {
    /// Sites resolved and persisted
    pub checked: usize,
    pub working: usize,
    /// Sites checked whose new status is not `WORKING`
    pub down: usize,
    /// Transition events emitted
    pub transitions: usize,
    /// Inactive sites passed over
    pub skipped: usize,
    /// True when shutdown stopped the sweep early
    pub cancelled: bool,
}

/// Event emitted by the monitor and the façade.
#[derive(Debug, Clone, PartialEq)]
pub enum MonitorEvent {
    SiteDown(StatusTransition),
    SiteRecovered(StatusTransition),
    DomainChanged(StatusTransition),
    SweepSummary(SweepSummary),
    Test { message: String },
}

impl MonitorEvent {
    /// Wire name of the event kind.
    pub fn action(&self) -> &'static str {
        match self {
            MonitorEvent::SiteDown(_) => "site_down",
            MonitorEvent::SiteRecovered(_) => "site_recovered",
            MonitorEvent::DomainChanged(_) => "domain_changed",
            MonitorEvent::SweepSummary(_) => "sweep_summary",
            MonitorEvent::Test { .. } => "test",
        }
    }

    pub fn payload(&self) -> serde_json::Value {
        let value = match self {
            MonitorEvent::SiteDown(t)
            | MonitorEvent::SiteRecovered(t)
            | MonitorEvent::DomainChanged(t) => serde_json::to_value(t),
            MonitorEvent::SweepSummary(s) => serde_json::to_value(s),
            MonitorEvent::Test { message } => Ok(serde_json::json!({ "message": message })),
        };
        value.unwrap_or(serde_json::Value::Null)
    }

    /// The transition carried by the event, if any.
    pub fn transition(&self) -> Option<&StatusTransition> {
        match self {
            MonitorEvent::SiteDown(t)
            | MonitorEvent::SiteRecovered(t)
            | MonitorEvent::DomainChanged(t) => Some(t),
            _ => None,
        }
    }
}

/// Outbound port for monitoring events.
pub trait Notifier: Send + Sync {
    /// Hands the event over without waiting for delivery.
    fn emit(&self, event: MonitorEvent);
}

/// Writes every event to the log. Used when no webhook is configured.
#[derive(Debug, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn emit(&self, event: MonitorEvent) {
        match &event {
            MonitorEvent::SiteDown(t) => info!(
                "[site_down] {} is {} (last URL {})",
                t.site_name,
                t.to,
                t.old_url.as_deref().unwrap_or("-")
            ),
            MonitorEvent::SiteRecovered(t) => info!(
                "[site_recovered] {} is back at {}",
                t.site_name,
                t.new_url.as_deref().unwrap_or("-")
            ),
            MonitorEvent::DomainChanged(t) => info!(
                "[domain_changed] {} moved from {} to {}",
                t.site_name,
                t.old_url.as_deref().unwrap_or("-"),
                t.new_url.as_deref().unwrap_or("-")
            ),
            MonitorEvent::SweepSummary(s) => info!(
                "[sweep_summary] checked {}, working {}, down {}, transitions {}, skipped {}{}",
                s.checked,
                s.working,
                s.down,
                s.transitions,
                s.skipped,
                if s.cancelled { " (cancelled)" } else { "" }
            ),
            MonitorEvent::Test { message } => info!("[test] {}", message),
        }
    }
}
