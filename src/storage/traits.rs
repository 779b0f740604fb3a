//! Storage traits and error types
//!
//! This module defines the trait interface for record store backends and
//! associated error types.

use crate::model::{HeavyRecord, LightRecord};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for storage operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Trait for record store backends
///
/// The store is write-once with respect to identifiers: there are no update
/// or delete operations. `exists` is keyed off the heavy record so a crawl
/// interrupted between the two inserts retries that post in full on the
/// next run.
pub trait RecordStore: Send {
    /// Returns whether a post with this identifier is fully persisted
    fn exists(&self, id: &str) -> StoreResult<bool>;

    /// Inserts the index view of a post
    ///
    /// Inserting an identifier that is already present is a no-op, so a
    /// retried post can complete a pair left behind by an earlier failure.
    fn insert_light(&mut self, record: &LightRecord) -> StoreResult<()>;

    /// Inserts the content view of a post
    fn insert_heavy(&mut self, record: &HeavyRecord) -> StoreResult<()>;

    /// URL of the most recently uploaded post, used to resume navigation
    fn resume_anchor(&self) -> StoreResult<Option<String>>;
}
