//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the Alertmap database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Index view of each post: one row per identifier, written once, never
-- updated. Timestamps are RFC 3339 text; categories is a JSON array.
CREATE TABLE IF NOT EXISTS light_records (
    id TEXT PRIMARY KEY,
    url TEXT NOT NULL,
    title TEXT NOT NULL,
    upload_time TEXT NOT NULL,
    update_time TEXT,
    categories TEXT,
    latitude REAL,
    longitude REAL,
    inserted_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_light_upload_time ON light_records(upload_time);

-- Content view of each post, paired 1:1 with light_records by identifier
CREATE TABLE IF NOT EXISTS heavy_records (
    id TEXT PRIMARY KEY,
    url TEXT NOT NULL,
    title TEXT NOT NULL,
    upload_time TEXT NOT NULL,
    update_time TEXT,
    content_markup TEXT NOT NULL,
    inserted_at TEXT NOT NULL
);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_schema_initializes() {
        let conn = Connection::open_in_memory().unwrap();
        let result = initialize_schema(&conn);
        assert!(result.is_ok());
    }

    #[test]
    fn test_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();

        // Initialize twice
        initialize_schema(&conn).unwrap();
        let result = initialize_schema(&conn);

        // Should succeed the second time too
        assert!(result.is_ok());
    }

    #[test]
    fn test_tables_exist_after_init() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();

        let tables = vec!["light_records", "heavy_records"];

        for table in tables {
            let count: Result<i64, _> = conn.query_row(
                &format!(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='{}'",
                    table
                ),
                [],
                |row| row.get(0),
            );
            assert!(count.is_ok());
            assert_eq!(count.unwrap(), 1, "Table {} should exist", table);
        }
    }
}
