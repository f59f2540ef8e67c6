//! Service lifecycle helpers.

pub mod shutdown;
pub mod statistics;

pub use shutdown::shutdown_gracefully;
pub use statistics::print_error_statistics;
