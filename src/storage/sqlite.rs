//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the RecordStore
//! trait. Both record views live in the same database file, in separate
//! tables keyed by post identifier.

use crate::model::{HeavyRecord, LightRecord};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{RecordStore, StoreResult};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// SQLite record store backend
pub struct SqliteStore {
    conn: Connection,
}

/// Store summary for the statistics mode
#[derive(Debug, Clone)]
pub struct StoreStats {
    pub light_count: u64,
    pub heavy_count: u64,
    pub categorized: u64,
    pub located: u64,
    pub newest_upload: Option<String>,
}

impl SqliteStore {
    /// Creates a new SqliteStore instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStore)` - Successfully opened/created database
    /// * `Err(StoreError)` - Failed to open database
    pub fn open(path: &Path) -> StoreResult<Self> {
        let conn = Connection::open(path)?;

        // Configure SQLite for better performance
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
        ",
        )?;

        // Initialize schema
        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    #[cfg(test)]
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Summarizes the store contents
    pub fn stats(&self) -> StoreResult<StoreStats> {
        let light_count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM light_records", [], |row| row.get(0))?;
        let heavy_count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM heavy_records", [], |row| row.get(0))?;
        let categorized: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM light_records WHERE categories IS NOT NULL",
            [],
            |row| row.get(0),
        )?;
        let located: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM light_records WHERE latitude IS NOT NULL",
            [],
            |row| row.get(0),
        )?;
        let newest_upload: Option<String> = self.conn.query_row(
            "SELECT MAX(upload_time) FROM light_records",
            [],
            |row| row.get(0),
        )?;

        Ok(StoreStats {
            light_count: light_count as u64,
            heavy_count: heavy_count as u64,
            categorized: categorized as u64,
            located: located as u64,
            newest_upload,
        })
    }
}

impl RecordStore for SqliteStore {
    fn exists(&self, id: &str) -> StoreResult<bool> {
        let found: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM heavy_records WHERE id = ?1",
                params![id],
                |row| row.get(0),
            )
            .optional()?;

        Ok(found.is_some())
    }

    fn insert_light(&mut self, record: &LightRecord) -> StoreResult<()> {
        let categories = record
            .categories
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;
        let (latitude, longitude) = match record.location {
            Some(coords) => (Some(coords.latitude), Some(coords.longitude)),
            None => (None, None),
        };
        let now = Utc::now().to_rfc3339();

        self.conn.execute(
            "INSERT OR IGNORE INTO light_records
             (id, url, title, upload_time, update_time, categories, latitude, longitude, inserted_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                record.id,
                record.url,
                record.title,
                record.date.upload_time.to_rfc3339(),
                record.date.update_time.map(|t| t.to_rfc3339()),
                categories,
                latitude,
                longitude,
                now
            ],
        )?;

        Ok(())
    }

    fn insert_heavy(&mut self, record: &HeavyRecord) -> StoreResult<()> {
        let now = Utc::now().to_rfc3339();

        self.conn.execute(
            "INSERT INTO heavy_records
             (id, url, title, upload_time, update_time, content_markup, inserted_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                record.id,
                record.url,
                record.title,
                record.date.upload_time.to_rfc3339(),
                record.date.update_time.map(|t| t.to_rfc3339()),
                record.content_markup,
                now
            ],
        )?;

        Ok(())
    }

    fn resume_anchor(&self) -> StoreResult<Option<String>> {
        let url = self
            .conn
            .query_row(
                "SELECT url FROM light_records ORDER BY upload_time DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?;

        Ok(url)
    }
}
