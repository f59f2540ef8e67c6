//! Persistence of site records.

mod migrations;
mod pool;
mod repository;
mod sqlite;

pub use migrations::run_migrations;
pub use pool::{init_db_pool_with_path, init_memory_pool};
pub use repository::SiteRepository;
pub use sqlite::SqliteSiteRepository;
