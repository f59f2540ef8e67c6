//! Error type definitions.
//!
//! This module defines the error enums surfaced by each component and the
//! `ErrorType` counters tracked by `ProcessingStats`.

use log::SetLoggerError;
use reqwest::Error as ReqwestError;
use strum_macros::{AsRefStr, EnumIter as EnumIterMacro};
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)] // All variants end with "Error" by convention
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),

    /// Error initializing an HTTP client.
    #[error("HTTP client initialization error: {0}")]
    HttpClientError(#[from] ReqwestError),

    /// The supplied configuration cannot be used.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Error types for database operations.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Error creating the database file.
    #[error("Database file creation error: {0}")]
    FileCreationError(String),

    /// SQL execution error.
    #[error("SQL error: {0}")]
    SqlError(#[from] sqlx::Error),

    /// Migration error.
    #[error("Migration error: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),
}

/// Failure of a single search call against the browser automation endpoint.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BrowserError {
    /// Transport error, non-2xx response or malformed body.
    #[error("browser automation unavailable: {0}")]
    Unavailable(String),

    /// The search script did not finish in time.
    #[error("browser automation timed out")]
    Timeout,
}

/// Reasons a sweep did not run to completion.
#[derive(Error, Debug)]
pub enum SweepError {
    /// Another sweep holds the sweep lock.
    #[error("a sweep is already running")]
    Busy,

    /// Shutdown was requested before or during the sweep.
    #[error("sweep cancelled by shutdown")]
    Cancelled,

    /// The repository failed; the sweep stopped without further writes.
    #[error("repository unavailable: {0}")]
    Repository(#[from] DatabaseError),
}

/// Error kinds surfaced to the HTTP surface.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("already exists: {0}")]
    AlreadyExists(String),

    #[error("a sweep is already running")]
    Busy,

    #[error("invalid input: {0}")]
    Invalid(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<DatabaseError> for ApiError {
    fn from(e: DatabaseError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl From<SweepError> for ApiError {
    fn from(e: SweepError) -> Self {
        match e {
            SweepError::Busy => ApiError::Busy,
            SweepError::Cancelled => ApiError::Internal("service is shutting down".to_string()),
            SweepError::Repository(db) => ApiError::Internal(db.to_string()),
        }
    }
}

/// Transient failures counted while resolving and monitoring sites.
///
/// These never fail a sweep; they are tracked for the metrics endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro, AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorType {
    // Search (browser automation) errors
    BrowserUnavailable,
    BrowserTimeout,
    // Probe errors
    ProbeTimeout,
    ProbeConnectError,
    ProbeRedirectError,
    ProbeHttpStatus,
    ProbeOtherError,
    // Notifier errors
    NotifierDropped,
    NotifierDeliveryFailed,
    // Persistence errors
    RepositoryError,
}
