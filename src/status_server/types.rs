//! Status server state.

use std::sync::Arc;
use std::time::Instant;

use crate::api::CoreApi;
use crate::error_handling::ProcessingStats;
use crate::monitor::Monitor;

/// Shared state for the status server
#[derive(Clone)]
pub struct StatusState {
    pub api: Arc<CoreApi>,
    pub monitor: Arc<Monitor>,
    pub error_stats: Arc<ProcessingStats>,
    pub start_time: Arc<Instant>,
}
