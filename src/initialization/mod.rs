//! Application initialization and resource setup.
//!
//! This module provides functions to initialize the shared resources:
//! - Logger
//! - HTTP clients for probing, browser automation and webhook delivery
//!
//! All initialization functions return proper error types for error handling.

mod client;
mod logger;

// Re-export public API
pub use client::{init_browser_client, init_notifier_client, init_probe_client};
pub use logger::init_logger_with;
