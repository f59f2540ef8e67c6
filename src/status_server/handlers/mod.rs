//! Status server HTTP handlers.

mod health;
mod metrics;

pub use health::health_handler;
pub use metrics::metrics_handler;
