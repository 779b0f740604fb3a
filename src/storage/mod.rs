//! Storage module for persisting crawled posts
//!
//! This module handles all database operations for the crawler, including:
//! - SQLite database initialization and schema management
//! - Write-once persistence of light and heavy record views
//! - Resume anchor lookup for incremental runs

mod schema;
mod sqlite;
mod traits;

pub use sqlite::{SqliteStore, StoreStats};
pub use traits::{RecordStore, StoreError, StoreResult};

use std::path::Path;

/// Initializes or opens a record store database
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
///
/// # Returns
///
/// * `Ok(SqliteStore)` - Successfully initialized store
/// * `Err(StoreError)` - Failed to initialize store
pub fn open_store(path: &Path) -> StoreResult<SqliteStore> {
    SqliteStore::open(path)
}
